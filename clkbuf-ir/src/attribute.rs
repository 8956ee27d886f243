use clkbuf_utils::Id;
use std::collections::HashMap;

/// The known attributes a wire or module can carry. See the attribute
/// vocabulary in the external interface for their meaning.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum Attribute {
    /// `clkbuf_inhibit`: user opt-out, never insert a buffer on this wire.
    Inhibit,
    /// `clkbuf_driver`: this port bit already emits a buffered clock.
    Driver,
    /// `clkbuf_sink`: this port bit requires a buffered clock.
    Sink,
    /// `clkbuf_inv`: this port's bit passes through an inverter from the
    /// named partner port's same bit.
    Inv,
    /// Internal marker: this cell or wire was materialised by the pass
    /// itself, not present in the user's input netlist.
    Generated,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Attribute::Inhibit => "clkbuf_inhibit",
            Attribute::Driver => "clkbuf_driver",
            Attribute::Sink => "clkbuf_sink",
            Attribute::Inv => "clkbuf_inv",
            Attribute::Generated => "generated",
        };
        write!(f, "{s}")
    }
}

impl TryFrom<&str> for Attribute {
    type Error = ();

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Ok(match s {
            "clkbuf_inhibit" => Attribute::Inhibit,
            "clkbuf_driver" => Attribute::Driver,
            "clkbuf_sink" => Attribute::Sink,
            "clkbuf_inv" => Attribute::Inv,
            _ => return Err(()),
        })
    }
}

/// The value carried by an attribute. Boolean attributes (`clkbuf_inhibit`,
/// `clkbuf_driver`, `clkbuf_sink`) store [`AttrValue::Flag`]; `clkbuf_inv`
/// stores the partner port name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    Flag,
    Partner(Id),
}

/// A small attribute map attached to wires and modules.
///
/// Mirrors the `has`/`get`/`insert` surface of a richer attribute map but is
/// kept to a flat [`HashMap`] since the vocabulary here is fixed and small.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes(HashMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(attr: Attribute) -> String {
        attr.to_string()
    }

    pub fn set_flag(&mut self, attr: Attribute) {
        self.0.insert(Self::key(attr), AttrValue::Flag);
    }

    pub fn set_partner(&mut self, attr: Attribute, partner: Id) {
        self.0.insert(Self::key(attr), AttrValue::Partner(partner));
    }

    pub fn has(&self, attr: Attribute) -> bool {
        self.0.contains_key(&Self::key(attr))
    }

    pub fn partner(&self, attr: Attribute) -> Option<Id> {
        match self.0.get(&Self::key(attr)) {
            Some(AttrValue::Partner(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn remove(&mut self, attr: Attribute) {
        self.0.remove(&Self::key(attr));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
