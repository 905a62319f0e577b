//! Path, result-object and error bookkeeping shared by both engines.

use std::collections::BTreeMap;

use kumiki::value::Value;
use kumiki::window::Window;
use tracing::debug;

use crate::error::{Cause, Error, Path};
use crate::Phase;

/// One offset-tracking event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Event {
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    path: usize,
    objects: usize,
    errors: usize,
    events: usize,
}

/// Per-call state of a decode or encode.
#[derive(Debug, Default)]
pub(crate) struct Reporter {
    path: Vec<String>,
    objects: Vec<BTreeMap<String, Value>>,
    partial: bool,
    errors: Vec<Error>,
    /// Nesting depth of trial decodes; errors are never recorded inside one.
    trial: usize,
    tracking: bool,
    events: Vec<Event>,
    /// Nodes entered and not yet left, bounded by `max_depth`.
    depth: usize,
    max_depth: usize,
}

impl Reporter {
    pub fn new(partial: bool, tracking: bool) -> Self {
        Reporter {
            partial,
            tracking,
            max_depth: crate::DEFAULT_MAX_DEPTH,
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Counts one more nested node; fails once the limit is passed.
    pub fn descend(&mut self) -> Result<(), Cause> {
        if self.depth >= self.max_depth {
            return Err(Cause::TooDeep(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn enter_key(&mut self, key: impl Into<String>) {
        self.path.push(key.into());
    }

    pub fn exit_key(&mut self) {
        self.path.pop();
    }

    /// Pops the key and assigns `value` to it in the innermost open object.
    pub fn leave_key(&mut self, value: Value) {
        if let Some(key) = self.path.pop() {
            if let Some(obj) = self.objects.last_mut() {
                obj.insert(key, value);
            }
        }
    }

    pub fn enter_object(&mut self) {
        self.objects.push(BTreeMap::new());
    }

    pub fn leave_object(&mut self) -> Value {
        Value::Object(self.objects.pop().unwrap_or_default())
    }

    pub fn path(&self) -> Path {
        Path(self.path.clone())
    }

    pub fn decode_error(&self, cause: impl Into<Cause>) -> Error {
        Error::Decode {
            path: self.path(),
            cause: cause.into(),
        }
    }

    pub fn encode_error(&self, cause: impl Into<Cause>) -> Error {
        Error::Encode {
            path: self.path(),
            cause: cause.into(),
        }
    }

    /// Keeps `err` for the caller when partial results are wanted.
    ///
    /// Returns the error back when it has to propagate instead.
    pub fn record(&mut self, err: Error) -> Result<(), Error> {
        if !self.partial || self.trial > 0 {
            return Err(err);
        }
        debug!(error = %err, "recorded partial decode error");
        self.errors.push(err);
        Ok(())
    }

    pub fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }

    pub fn track(&mut self, start: usize, end: usize, phase: Phase) {
        if self.tracking {
            self.events.push(Event {
                path: self.path.join("/"),
                start,
                end,
                phase,
            });
        }
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            path: self.path.len(),
            objects: self.objects.len(),
            errors: self.errors.len(),
            events: self.events.len(),
        }
    }

    pub fn restore(&mut self, cp: Checkpoint) {
        self.path.truncate(cp.path);
        self.objects.truncate(cp.objects);
        self.errors.truncate(cp.errors);
        self.events.truncate(cp.events);
    }

    /// Runs `f` as a strict attempt that leaves no trace when it fails.
    ///
    /// Keys assigned by the attempt go to a scratch object which is merged
    /// into the enclosing object only on success.
    pub fn attempt<'a, T>(
        &mut self,
        input: &mut Window<'a>,
        f: impl FnOnce(&mut Self, &mut Window<'a>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let cp = self.checkpoint();
        let save = input.save();
        self.trial += 1;
        self.enter_object();
        let result = f(self, input);
        self.trial -= 1;
        match result {
            Ok(value) => {
                let scratch = self.objects.pop().unwrap_or_default();
                if let Some(obj) = self.objects.last_mut() {
                    obj.extend(scratch);
                }
                Ok(value)
            }
            Err(err) => {
                self.restore(cp);
                input.restore(save);
                Err(err)
            }
        }
    }

    /// Reports whether `f` would succeed, restoring all state either way.
    pub fn lookahead<'a, T>(
        &mut self,
        input: &mut Window<'a>,
        f: impl FnOnce(&mut Self, &mut Window<'a>) -> Result<T, Error>,
    ) -> bool {
        let cp = self.checkpoint();
        let save = input.save();
        let present = self.attempt(input, f).is_ok();
        self.restore(cp);
        input.restore(save);
        present
    }
}

#[cfg(test)]
mod tests {
    use kumiki::value::Value;
    use kumiki::window::Window;

    use super::Reporter;
    use crate::Phase;
    use crate::error::{Cause, Error};

    #[test]
    fn test_keys_assign_into_innermost_object() {
        let mut rep = Reporter::new(false, false);
        rep.enter_object();
        rep.enter_key("a");
        rep.enter_object();
        rep.enter_key("x");
        rep.leave_key(Value::from(1i64));
        let inner = rep.leave_object();
        rep.leave_key(inner);
        let outer = rep.leave_object();
        assert_eq!(
            Value::object([("a", Value::object([("x", Value::from(1i64))]))]),
            outer
        );
    }

    #[test]
    fn test_error_carries_path() {
        let mut rep = Reporter::new(false, false);
        rep.enter_key("tbs");
        rep.enter_key("serial");
        let err = rep.decode_error(Cause::NoChoiceMatched);
        assert_eq!("no choice matched at: tbs/serial", err.to_string());
        rep.exit_key();
        rep.exit_key();
        assert_eq!("(shallow)", rep.path().to_string());
    }

    #[test]
    fn test_record_only_in_partial_mode() {
        let mut strict = Reporter::new(false, false);
        assert!(strict.record(strict.decode_error(Cause::NoChoiceMatched)).is_err());

        let mut partial = Reporter::new(true, false);
        let err = partial.decode_error(Cause::NoChoiceMatched);
        assert!(partial.record(err).is_ok());
        assert_eq!(1, partial.take_errors().len());
    }

    #[test]
    fn test_failed_attempt_leaves_no_trace() {
        let data = [0x01, 0x02, 0x03];
        let mut input = Window::new(&data);
        let mut rep = Reporter::new(true, true);
        rep.enter_object();

        let result: Result<(), Error> = rep.attempt(&mut input, |rep, input| {
            input.read_u8().map_err(|e| rep.decode_error(e))?;
            rep.enter_key("lost");
            rep.track(0, 1, Phase::Tagged);
            rep.leave_key(Value::Null);
            // errors inside an attempt always propagate
            let err = rep.decode_error(Cause::NoChoiceMatched);
            rep.record(err)
        });
        assert!(result.is_err());
        assert_eq!(0, input.offset());
        assert!(rep.take_events().is_empty());
        assert!(rep.take_errors().is_empty());
        assert_eq!(Value::object(Vec::<(String, Value)>::new()), rep.leave_object());
    }

    #[test]
    fn test_successful_attempt_merges_keys() {
        let data = [0x01];
        let mut input = Window::new(&data);
        let mut rep = Reporter::new(false, false);
        rep.enter_object();
        let ok = rep.attempt(&mut input, |rep, input| {
            let b = input.read_u8().map_err(|e| rep.decode_error(e))?;
            rep.enter_key("b");
            rep.leave_key(Value::from(b as i64));
            Ok(())
        });
        assert!(ok.is_ok());
        assert_eq!(1, input.offset());
        assert_eq!(Some(&Value::from(1i64)), rep.leave_object().get("b"));
    }

    #[test]
    fn test_depth_limit() {
        let mut rep = Reporter::new(false, false).with_max_depth(2);
        assert!(rep.descend().is_ok());
        assert!(rep.descend().is_ok());
        assert!(matches!(rep.descend(), Err(Cause::TooDeep(2))));
        rep.ascend();
        assert!(rep.descend().is_ok());
    }

    #[test]
    fn test_lookahead_always_restores() {
        let data = [0x01];
        let mut input = Window::new(&data);
        let mut rep = Reporter::new(false, false);
        let present = rep.lookahead(&mut input, |rep, input| {
            input.read_u8().map_err(|e| rep.decode_error(e))
        });
        assert!(present);
        assert_eq!(0, input.offset());
    }
}
