use std::sync::Once;

use rrpool::RecordCounts;

static INIT: Once = Once::new();

/// Routes the crate's `log` records into a test-captured tracing subscriber.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_log::LogTracer::init();
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// A stand-in for an encoder's message type: just the four sections.
#[allow(dead_code)]
pub struct Msg {
    pub question: Vec<String>,
    pub answer: Vec<String>,
    pub ns: Vec<String>,
    pub extra: Vec<String>,
}

#[allow(dead_code)]
impl Msg {
    pub fn new(question: usize, answer: usize, ns: usize, extra: usize) -> Self {
        let names = |section: &str, n: usize| -> Vec<String> {
            (0..n).map(|i| format!("{section}{i}.example.org.")).collect()
        };
        Self {
            question: names("q", question),
            answer: names("an", answer),
            ns: names("ns", ns),
            extra: names("ar", extra),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.question
            .iter()
            .chain(&self.answer)
            .chain(&self.ns)
            .chain(&self.extra)
    }
}

impl rrpool::Records for Msg {
    fn record_counts(&self) -> RecordCounts {
        RecordCounts::new(
            self.question.len(),
            self.answer.len(),
            self.ns.len(),
            self.extra.len(),
        )
    }
}
