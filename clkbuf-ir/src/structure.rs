use crate::Attributes;
use clkbuf_utils::{GetName, Id};
use linked_hash_map::LinkedHashMap;

/// A single signal bit: either a bit of a named wire, or a tied-off constant.
///
/// Two [`Bit::Wire`] values name the same bit iff their `(wire, index)` pair
/// is equal; equivalence *across* distinct wires (because they are declared
/// connected) is the job of the signal-equivalence resolver, not of this
/// type.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Bit {
    Wire(Id, u32),
    Const(bool),
}

impl Bit {
    pub fn wire_name(&self) -> Option<Id> {
        match self {
            Bit::Wire(w, _) => Some(*w),
            Bit::Const(_) => None,
        }
    }
}

/// A vector of bits, LSB first, naming the signal connected to a cell port
/// or appearing on one side of a connect statement.
pub type SigSpec = Vec<Bit>;

/// A named, fixed-width wire. A wire that is a module port carries
/// `is_input`/`is_output`; a wire that is both is an inout.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Wire {
    pub name: Id,
    pub width: u32,
    pub attributes: Attributes,
    pub is_input: bool,
    pub is_output: bool,
}

impl Wire {
    pub fn new(name: impl Into<Id>, width: u32) -> Self {
        Wire {
            name: name.into(),
            width,
            attributes: Attributes::new(),
            is_input: false,
            is_output: false,
        }
    }

    pub fn is_port(&self) -> bool {
        self.is_input || self.is_output
    }

    /// The signal spec naming every bit of this wire, LSB first.
    pub fn bits(&self) -> SigSpec {
        (0..self.width)
            .map(|i| Bit::Wire(self.name, i))
            .collect()
    }
}

impl GetName for Wire {
    fn name(&self) -> Id {
        self.name
    }
}

/// An instance of a named cell-type (itself a [`crate::Module`], regular or
/// blackbox) with a port-name -> signal mapping. Port order is preserved
/// since hardware tools frequently rely on it for pretty-printing.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub name: Id,
    pub cell_type: Id,
    #[cfg_attr(feature = "serialize", serde(with = "linked_map_as_vec"))]
    pub connections: LinkedHashMap<Id, SigSpec>,
    pub attributes: Attributes,
}

impl Cell {
    pub fn new(name: impl Into<Id>, cell_type: impl Into<Id>) -> Self {
        Cell {
            name: name.into(),
            cell_type: cell_type.into(),
            connections: LinkedHashMap::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn connect(&mut self, port: impl Into<Id>, sig: SigSpec) {
        self.connections.insert(port.into(), sig);
    }

    pub fn port(&self, port: impl Into<Id>) -> Option<&SigSpec> {
        self.connections.get(&port.into())
    }
}

impl GetName for Cell {
    fn name(&self) -> Id {
        self.name
    }
}

/// A module-level connect statement: `lhs` is driven by `rhs`. Both sides
/// must have equal length; per-bit pairing establishes the equivalence
/// relation consumed by the signal-equivalence resolver.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Connect {
    pub lhs: SigSpec,
    pub rhs: SigSpec,
}

#[cfg(feature = "serialize")]
mod linked_map_as_vec {
    use clkbuf_utils::Id;
    use linked_hash_map::LinkedHashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, V>(
        map: &LinkedHashMap<Id, V>,
        ser: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        map.iter().collect::<Vec<_>>().serialize(ser)
    }

    pub fn deserialize<'de, D, V>(
        de: D,
    ) -> Result<LinkedHashMap<Id, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let items: Vec<(Id, V)> = Vec::deserialize(de)?;
        Ok(items.into_iter().collect())
    }
}
