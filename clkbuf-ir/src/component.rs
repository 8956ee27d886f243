use crate::structure::{Cell, Connect, Wire};
use clkbuf_utils::{GetName, Id};
use linked_hash_map::LinkedHashMap;

/// A named container of wires, cells, and connect statements: a module may
/// be a *blackbox* (declaration only, its wires describe a cell-type's
/// ports and their clkbuf attributes) or *regular* (a full body the pass
/// rewrites). A module may additionally be marked *top*.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub name: Id,
    pub wires: IdList<Wire>,
    pub cells: IdList<Cell>,
    /// Wire names that are ports, in declaration order.
    pub ports: Vec<Id>,
    pub connections: Vec<Connect>,
    pub is_top: bool,
    pub is_blackbox: bool,
}

impl Module {
    pub fn new(name: impl Into<Id>) -> Self {
        Module {
            name: name.into(),
            wires: IdList::default(),
            cells: IdList::default(),
            ports: Vec::new(),
            connections: Vec::new(),
            is_top: false,
            is_blackbox: false,
        }
    }

    pub fn blackbox(name: impl Into<Id>) -> Self {
        let mut m = Module::new(name);
        m.is_blackbox = true;
        m
    }

    /// Cell-type names instantiated by this module, deduplicated but not
    /// ordered; used to build the module-instantiation graph.
    pub fn instantiated_types(&self) -> impl Iterator<Item = Id> + '_ {
        self.cells.iter().map(|c| c.cell_type)
    }

    pub fn port_wires(&self) -> impl Iterator<Item = &Wire> + '_ {
        self.ports.iter().filter_map(move |name| self.wires.find(*name))
    }

    /// Re-derive `ports` from the wires' `is_input`/`is_output` flags,
    /// preserving the relative order of the previous port list for wires
    /// that are still ports and appending any newly-promoted ports at the
    /// end. Called after a port-name swap changes which wire occupies a
    /// port slot.
    pub fn reindex_ports(&mut self) {
        let mut seen: Vec<Id> = self
            .ports
            .iter()
            .copied()
            .filter(|n| self.wires.find(*n).is_some_and(|w| w.is_port()))
            .collect();
        for w in self.wires.iter() {
            if w.is_port() && !seen.contains(&w.name) {
                seen.push(w.name);
            }
        }
        self.ports = seen;
    }
}

impl GetName for Module {
    fn name(&self) -> Id {
        self.name
    }
}

/// An ordered collection of named entities with deterministic iteration and
/// constant-time look-up by name. Assumes the name of an entity does not
/// change out from under the list; a wire whose identity is handed to a new
/// port (the port-name swap) is removed and reinserted rather than mutated
/// in place.
#[derive(Debug, Clone)]
pub struct IdList<T: GetName>(LinkedHashMap<Id, T>);

impl<'a, T: GetName> IntoIterator for &'a IdList<T> {
    type Item = &'a T;
    type IntoIter = linked_hash_map::Values<'a, Id, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

impl<T, F> From<F> for IdList<T>
where
    T: GetName,
    F: IntoIterator<Item = T>,
{
    fn from(list: F) -> Self {
        IdList(
            list.into_iter()
                .map(|item| (item.name(), item))
                .collect::<LinkedHashMap<Id, T>>(),
        )
    }
}

impl<T: GetName> IdList<T> {
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn retain<F>(&mut self, mut f: F) -> u64
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        for entry in self.0.entries() {
            if !f(entry.get()) {
                entry.remove();
                removed += 1;
            }
        }
        removed
    }

    pub fn add(&mut self, item: T) {
        let name = item.name();
        self.0.insert(name, item);
    }

    pub fn remove<S>(&mut self, name: S) -> Option<T>
    where
        S: Into<Id>,
    {
        self.0.remove(&name.into())
    }

    pub fn append(&mut self, items: impl Iterator<Item = T>) {
        let map = items.map(|i| (i.name(), i));
        self.0.extend(map);
    }

    pub fn iter(&self) -> impl Clone + Iterator<Item = &T> {
        self.0.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut().map(|(_id, val)| val)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> {
        std::mem::take(&mut self.0).into_iter().map(|(_, v)| v)
    }

    pub fn find<S>(&self, name: S) -> Option<&T>
    where
        S: Into<Id>,
    {
        self.0.get(&name.into())
    }

    pub fn find_mut<S>(&mut self, name: S) -> Option<&mut T>
    where
        S: Into<Id>,
    {
        self.0.get_mut(&name.into())
    }
}

impl<T: GetName> Default for IdList<T> {
    fn default() -> Self {
        IdList(LinkedHashMap::new())
    }
}

#[cfg(feature = "serialize")]
impl<T: GetName + serde::Serialize> serde::Serialize for IdList<T> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = ser.serialize_seq(Some(self.len()))?;
        for obj in self.iter() {
            seq.serialize_element(obj)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serialize")]
impl<'de, T: GetName + serde::Deserialize<'de>> serde::Deserialize<'de> for IdList<T> {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(de)?;
        Ok(IdList::from(items))
    }
}
