//! Decode engine: walks a schema tree against an input window.

use kumiki::backend::Backend;
use kumiki::kind::{Kind, TagSpec};
use kumiki::value::Value;
use kumiki::window::Window;
use tracing::{debug, trace};

use crate::Phase;
use crate::error::{Cause, Error};
use crate::node::{Node, Schema};
use crate::reporter::Reporter;

pub(crate) struct DecodeEngine<'b, B: Backend> {
    backend: &'b B,
}

impl<'b, B: Backend> DecodeEngine<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        DecodeEngine { backend }
    }

    /// Decodes one node, assigning its value to its key in the open object.
    ///
    /// `Ok(None)` means an optional field was absent and has no default.
    pub fn decode_node<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Option<Value>, Error> {
        let Some(key) = &node.key else {
            return self.decode_nested(node, input, rep);
        };
        rep.enter_key(key.as_str());
        let result = self.decode_nested(node, input, rep);
        match &result {
            Ok(Some(value)) => rep.leave_key(value.clone()),
            _ => rep.exit_key(),
        }
        result
    }

    fn decode_nested<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Option<Value>, Error> {
        rep.descend().map_err(|c| rep.decode_error(c))?;
        let result = self.decode_keyed(node, input, rep);
        rep.ascend();
        result
    }

    fn decode_keyed<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Option<Value>, Error> {
        if node.optional && !self.is_present(node, input, rep)? {
            trace!(key = ?node.key, offset = input.offset(), "optional field absent");
            return Ok(node.default.clone());
        }

        if !node.obj {
            return self.decode_present(node, input, rep).map(Some);
        }
        rep.enter_object();
        let result = self.decode_present(node, input, rep);
        let obj = rep.leave_object();
        result.map(|_| Some(obj))
    }

    fn is_present<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<bool, Error> {
        let peeked = match node.presence_tag() {
            Some(tag) => self.backend.peek_tag(input, tag, false),
            None if node.any => self.backend.peek_tag(input, TagSpec::Any, true),
            // nothing to peek at: a choice or a bare `use`
            None => {
                return Ok(rep.lookahead(input, |rep, input| {
                    self.decode_indirection(node, input, rep)
                }));
            }
        };
        peeked.map_err(|e| rep.decode_error(e))
    }

    fn decode_present<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Value, Error> {
        match node.explicit {
            Some(n) => {
                let mut body = self.consume(input, TagSpec::Context(n), false, rep)?;
                self.decode_unwrapped(node, &mut body, rep)
            }
            None => self.decode_unwrapped(node, input, rep),
        }
    }

    fn decode_unwrapped<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Value, Error> {
        if node.is_indirection() {
            return self
                .decode_indirection(node, input, rep)
                .map(|v| v.unwrap_or(Value::Null));
        }
        if node.any {
            let save = input.save();
            self.consume(input, TagSpec::Any, true, rep)?;
            return Ok(Value::Bytes(input.raw_from(save).to_vec()));
        }

        let (Some(kind), Some(tag)) = (node.kind, node.own_tag()) else {
            return Err(rep.decode_error(Cause::TagOmitted));
        };
        let start = input.offset();
        let mut body = self.consume(input, tag, false, rep)?;
        rep.track(start, body.end(), Phase::Tagged);
        rep.track(body.offset(), body.end(), Phase::Content);

        let result = match kind {
            Kind::Seq | Kind::Set => Value::Null,
            Kind::SeqOf | Kind::SetOf => self.decode_list(node, &mut body, rep)?,
            _ => self
                .backend
                .decode_primitive(kind, &mut body, &node.args)
                .map_err(|e| rep.decode_error(e))?,
        };

        for child in node.children.iter().flatten() {
            if let Err(err) = self.decode_node(child, &mut body, rep) {
                rep.record(err)?;
            }
        }

        match &node.contains {
            Some(schema) => self.decode_contained(schema, &result, rep),
            None => Ok(result),
        }
    }

    fn decode_indirection<'a>(
        &self,
        node: &Node,
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Option<Value>, Error> {
        if let Some(target) = node.target().map_err(|c| rep.decode_error(c))? {
            return self.decode_node(target, input, rep);
        }
        match &node.choice {
            Some(branches) => self.decode_choice(branches, input, rep).map(Some),
            None => Err(rep.decode_error(Cause::TagOmitted)),
        }
    }

    fn decode_choice<'a>(
        &self,
        branches: &[(String, std::sync::Arc<Node>)],
        input: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Value, Error> {
        for (name, branch) in branches {
            match rep.attempt(input, |rep, input| self.decode_node(branch, input, rep)) {
                Ok(value) => {
                    debug!(branch = %name, "choice matched");
                    return Ok(Value::Choice {
                        branch: name.clone(),
                        value: Box::new(value.unwrap_or(Value::Null)),
                    });
                }
                Err(err) => trace!(branch = %name, error = %err, "choice branch rejected"),
            }
        }
        Err(rep.decode_error(Cause::NoChoiceMatched))
    }

    fn decode_list<'a>(
        &self,
        node: &Node,
        body: &mut Window<'a>,
        rep: &mut Reporter,
    ) -> Result<Value, Error> {
        let element = match &node.element {
            Some(schema) => schema.retag(None).map_err(|c| rep.decode_error(c))?,
            None => return Err(rep.decode_error(Cause::TagOmitted)),
        };
        let mut items = Vec::new();
        while !body.is_empty() {
            rep.enter_key(items.len().to_string());
            let item = self.decode_node(&element, body, rep);
            rep.exit_key();
            match item {
                Ok(value) => items.push(value.unwrap_or(Value::Null)),
                Err(err) => {
                    // the cursor may not have moved; stop instead of looping
                    rep.record(err)?;
                    break;
                }
            }
        }
        Ok(Value::List(items))
    }

    fn decode_contained(
        &self,
        schema: &Schema,
        payload: &Value,
        rep: &mut Reporter,
    ) -> Result<Value, Error> {
        let bytes = match payload {
            Value::BitString(bs) => bs.as_bytes(),
            Value::Bytes(b) => b.as_slice(),
            other => return Err(rep.decode_error(Cause::NotRaw(other.type_name()))),
        };
        let root = schema.defined_root().map_err(|c| rep.decode_error(c))?;
        let mut inner = Window::new(bytes);
        Ok(self
            .decode_node(root, &mut inner, rep)?
            .unwrap_or(Value::Null))
    }

    fn consume<'a>(
        &self,
        input: &mut Window<'a>,
        tag: TagSpec,
        allow_any: bool,
        rep: &Reporter,
    ) -> Result<Window<'a>, Error> {
        self.backend
            .consume_tag(input, tag, allow_any)
            .map_err(|e| rep.decode_error(e))
    }
}
