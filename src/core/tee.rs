//! Fan-out over several sinks

use super::{error::Result, field::Field, log_entry::LogEntry, log_level::LogLevel, sink::LogSink};

/// Writes every entry to each of its sinks that is enabled for the level
///
/// A failing sink does not stop the others; the last error is returned.
pub struct Tee {
    sinks: Vec<Box<dyn LogSink>>,
}

impl Tee {
    pub fn new(sinks: Vec<Box<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    #[must_use]
    pub fn and<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for Tee {
    fn enabled(&self, level: LogLevel) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    fn accept(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
        let mut last_error = None;
        for sink in self.sinks.iter().filter(|sink| sink.enabled(entry.level)) {
            if let Err(e) = sink.accept(entry, fields) {
                last_error = Some(e);
            }
        }
        last_error.map_or(Ok(()), Err)
    }

    fn with(&self, fields: Vec<Field>) -> Box<dyn LogSink> {
        Box::new(Tee {
            sinks: self
                .sinks
                .iter()
                .map(|sink| sink.with(fields.clone()))
                .collect(),
        })
    }

    fn flush(&self) -> Result<()> {
        let mut last_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                last_error = Some(e);
            }
        }
        last_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &str {
        "tee"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoggerError;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone)]
    struct MemorySink {
        min_level: LogLevel,
        fail: bool,
        inherited: Vec<Field>,
        seen: Arc<Mutex<Vec<(String, Vec<Field>)>>>,
    }

    impl MemorySink {
        fn new(min_level: LogLevel, fail: bool) -> Self {
            Self {
                min_level,
                fail,
                inherited: Vec::new(),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl LogSink for MemorySink {
        fn enabled(&self, level: LogLevel) -> bool {
            level >= self.min_level
        }

        fn accept(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
            let mut all = fields.to_vec();
            all.extend(self.inherited.iter().cloned());
            self.seen.lock().push((entry.message.clone(), all));
            if self.fail {
                return Err(LoggerError::other("memory sink failure"));
            }
            Ok(())
        }

        fn with(&self, fields: Vec<Field>) -> Box<dyn LogSink> {
            let mut derived = self.clone();
            derived.inherited.extend(fields);
            Box::new(derived)
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    #[test]
    fn test_tee_routes_by_level() {
        let console = MemorySink::new(LogLevel::Debug, false);
        let alerts = MemorySink::new(LogLevel::Error, false);
        let tee = Tee::new(Vec::new()).and(console.clone()).and(alerts.clone());

        assert!(tee.enabled(LogLevel::Debug));
        tee.accept(&LogEntry::new(LogLevel::Info, "info"), &[]).unwrap();
        tee.accept(&LogEntry::new(LogLevel::Error, "boom"), &[]).unwrap();

        assert_eq!(console.seen.lock().len(), 2);
        assert_eq!(alerts.seen.lock().len(), 1);
        assert_eq!(alerts.seen.lock()[0].0, "boom");
    }

    #[test]
    fn test_tee_continues_after_failure() {
        let failing = MemorySink::new(LogLevel::Debug, true);
        let healthy = MemorySink::new(LogLevel::Debug, false);
        let tee = Tee::new(Vec::new()).and(failing).and(healthy.clone());

        let result = tee.accept(&LogEntry::new(LogLevel::Warn, "disk full"), &[]);
        assert!(result.is_err());
        assert_eq!(healthy.seen.lock().len(), 1);
    }

    #[test]
    fn test_tee_with_derives_every_sink() {
        let a = MemorySink::new(LogLevel::Debug, false);
        let b = MemorySink::new(LogLevel::Debug, false);
        let tee = Tee::new(Vec::new()).and(a.clone()).and(b.clone());

        let derived = tee.with(vec![Field::new("service", "api")]);
        derived.accept(&LogEntry::new(LogLevel::Info, "hi"), &[]).unwrap();
        tee.accept(&LogEntry::new(LogLevel::Info, "plain"), &[]).unwrap();

        for sink in [&a, &b] {
            let seen = sink.seen.lock();
            assert_eq!(seen[0].1, vec![Field::new("service", "api")]);
            assert!(seen[1].1.is_empty());
        }
    }
}
