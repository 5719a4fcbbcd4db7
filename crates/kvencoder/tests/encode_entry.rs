use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use kvencoder::{
    Buffer, BufferPool, Caller, DurationFormat, EncoderConfig, EncoderSettings, Entry, Field,
    KvEncoder, Level, SyncPool, TimeFormat,
};

/// Pool wrapper that tracks how many buffers are currently on loan.
#[derive(Default)]
struct CountingPool {
    inner: SyncPool,
    outstanding: AtomicUsize,
    acquired: AtomicUsize,
}

impl BufferPool for CountingPool {
    fn acquire(&self) -> Buffer {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire()
    }

    fn release(&self, buf: Buffer) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.inner.release(buf);
    }
}

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date")
}

fn settings(caller_key: &str) -> EncoderSettings {
    EncoderSettings {
        caller_key: caller_key.to_string(),
        time_format: TimeFormat::Rfc3339,
        duration_format: DurationFormat::Seconds,
        ..EncoderSettings::default()
    }
}

fn encoder(caller_key: &str) -> KvEncoder {
    KvEncoder::with_pool(settings(caller_key).build(), Arc::new(SyncPool::new()))
}

fn line(enc: &KvEncoder, entry: &Entry, fields: &[Field]) -> String {
    let buf = enc.encode_entry(entry, fields);
    String::from_utf8(buf.to_vec()).expect("utf8")
}

#[test]
fn reference_line() {
    let enc = encoder("");
    let entry = Entry::new(Level::Info, new_year()).with_message("hello");
    let fields = [
        Field::duration("du", Duration::from_secs(2)),
        Field::int("val", 105),
        Field::bool("ok", false),
    ];
    assert_eq!(
        line(&enc, &entry, &fields),
        "[INFO][2024-01-01T00:00:00Z][] _undef||du=2||val=105||ok=false\n"
    );
}

#[test]
fn empty_field_list() {
    let enc = encoder("");
    let entry = Entry::new(Level::Warn, new_year());
    assert_eq!(
        line(&enc, &entry, &[]),
        "[WARN][2024-01-01T00:00:00Z][] _undef\n"
    );
}

#[test]
fn caller_bracket_rules() {
    let with_site = Entry::new(Level::Error, new_year())
        .with_caller(Caller::new("/work/app/src/net/conn.rs", 42));
    let without_site = Entry::new(Level::Error, new_year());

    let no_key = encoder("");
    let empty = "[ERROR][2024-01-01T00:00:00Z][] _undef\n";
    assert_eq!(line(&no_key, &with_site, &[]), empty);
    assert_eq!(line(&no_key, &without_site, &[]), empty);

    let keyed = encoder("caller");
    assert_eq!(
        line(&keyed, &with_site, &[]),
        "[ERROR][2024-01-01T00:00:00Z][net/conn.rs:42] _undef\n"
    );
    assert_eq!(
        line(&keyed, &without_site, &[]),
        "[ERROR][2024-01-01T00:00:00Z][] _undef\n"
    );
}

#[test]
fn nested_values_inline() {
    let enc = encoder("");
    let entry = Entry::new(Level::Info, new_year());
    let fields = [
        Field::object("obj", [Field::int("a", 1), Field::int("b", 2)]),
        Field::array("arr", [1, 2, 3]),
    ];
    assert_eq!(
        line(&enc, &entry, &fields),
        "[INFO][2024-01-01T00:00:00Z][] _undef||obj={||a=1||b=2}||arr=[123]\n"
    );
}

#[test]
fn custom_formatters() {
    let cfg = EncoderConfig::default()
        .with_caller_key("")
        .with_level_formatter(|level, buf| {
            buf.append_byte(b'<');
            buf.append_str(level.as_str());
            buf.append_byte(b'>');
        })
        .with_time_formatter(|t, buf| buf.append_int(t.timestamp()))
        .with_duration_formatter(|d, buf| buf.append_uint(d.as_secs()));
    let enc = KvEncoder::with_pool(cfg, Arc::new(SyncPool::new()));
    let entry = Entry::new(Level::Debug, new_year());
    assert_eq!(
        line(&enc, &entry, &[Field::duration("d", Duration::from_secs(90))]),
        "[<debug>][1704067200][] _undef||d=90\n"
    );
}

#[test]
fn encoding_is_idempotent() {
    let enc = encoder("caller");
    let entry = Entry::new(Level::Info, new_year()).with_caller(Caller::new("a/b/c.rs", 7));
    let fields = [
        Field::string("s", "text"),
        Field::binary("bin", b"\x00\x01".to_vec()),
        Field::float("f", 2.5),
    ];
    assert_eq!(line(&enc, &entry, &fields), line(&enc, &entry, &fields));
}

#[test]
fn concurrent_encodes_never_interleave() {
    let pool = Arc::new(CountingPool::default());
    let enc = KvEncoder::with_pool(settings("").build(), pool.clone());
    let entry = Entry::new(Level::Info, new_year());

    thread::scope(|s| {
        for t in 0..8u32 {
            let enc = &enc;
            let entry = &entry;
            s.spawn(move || {
                for i in 0..200u32 {
                    let fields = [
                        Field::uint("thread", t),
                        Field::uint("seq", i),
                        Field::string("pad", "x".repeat((i % 17) as usize)),
                    ];
                    let got = line(enc, entry, &fields);
                    let want = format!(
                        "[INFO][2024-01-01T00:00:00Z][] _undef||thread={t}||seq={i}||pad={}\n",
                        "x".repeat((i % 17) as usize)
                    );
                    assert_eq!(got, want);
                }
            });
        }
    });

    // Only the root encoder's buffer is still on loan.
    assert_eq!(pool.outstanding.load(Ordering::SeqCst), 1);
    assert_eq!(pool.acquired.load(Ordering::SeqCst), 1 + 8 * 200);
}

#[test]
fn buffer_released_when_formatter_panics() {
    let pool = Arc::new(CountingPool::default());
    let cfg = EncoderConfig::default().with_time_formatter(|_, _| panic!("clock unavailable"));
    let enc = KvEncoder::with_pool(cfg, pool.clone());
    let entry = Entry::new(Level::Info, new_year());

    let result = panic::catch_unwind(AssertUnwindSafe(|| enc.encode_entry(&entry, &[])));
    assert!(result.is_err());
    assert_eq!(pool.outstanding.load(Ordering::SeqCst), 1);
}

#[test]
fn returned_buffer_goes_back_to_pool() {
    let pool = Arc::new(SyncPool::new());
    let enc = KvEncoder::with_pool(settings("").build(), pool.clone());
    let entry = Entry::new(Level::Info, new_year());
    let buf = enc.encode_entry(&entry, &[Field::int("n", 1)]);
    assert_eq!(pool.idle_count(), 0);
    drop(buf);
    assert_eq!(pool.idle_count(), 1);
}
