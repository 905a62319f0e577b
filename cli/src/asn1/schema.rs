//! Schema able to walk any DER input without knowing its structure.

use asn1::{Dsl, Names, Schema};

/// Builds the recursive `Element` schema.
///
/// Every universal kind with a DER codec is a branch; constructed kinds recurse
/// into `Element`, and whatever else is left (context tags, malformed content)
/// falls through to a raw `any` capture.
pub(crate) fn element() -> asn1::Result<Schema> {
    let element = Schema::declare("Element");
    let nested = element.clone();
    element.define_body(|s| {
        s.choice([
            ("bool", s.bool()),
            ("int", s.int()),
            ("bitstr", s.bitstr()),
            ("octstr", s.octstr()),
            ("null", s.null()),
            ("objid", s.objid()),
            ("objdesc", s.objdesc()),
            ("enum", s.enumerated(Names::new(Vec::<(i64, &str)>::new()))),
            ("utf8str", s.utf8str()),
            ("numstr", s.numstr()),
            ("printstr", s.printstr()),
            ("t61str", s.t61str()),
            ("videostr", s.videostr()),
            ("ia5str", s.ia5str()),
            ("utctime", s.utctime()),
            ("gentime", s.gentime()),
            ("graphstr", s.graphstr()),
            ("iso646str", s.iso646str()),
            ("genstr", s.genstr()),
            ("unistr", s.unistr()),
            ("charstr", s.charstr()),
            ("bmpstr", s.bmpstr()),
            ("seq", s.seq_of(&nested)),
            ("set", s.set_of(&nested)),
            ("any", s.any()),
        ])
    })?;
    Ok(element)
}
