use std::marker::PhantomData;

use marchlands_protocol::Id;

/// Deterministic, append-only storage for entities of one kind.
///
/// - Stable iteration order: ascending id.
/// - Ids start at 1 and are never reused, so a removed id stays dead.
#[derive(Clone, Debug)]
pub struct EntityStore<Tag, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _tag: PhantomData<Tag>,
}

impl<Tag, T> Default for EntityStore<Tag, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _tag: PhantomData,
        }
    }
}

impl<Tag, T> EntityStore<Tag, T> {
    pub fn insert(&mut self, value: T) -> Id<Tag> {
        self.slots.push(Some(value));
        self.live += 1;
        Id::new(self.slots.len() as u32)
    }

    fn slot_index(id: Id<Tag>) -> Option<usize> {
        (id.raw as usize).checked_sub(1)
    }

    pub fn get(&self, id: Id<Tag>) -> Option<&T> {
        self.slots.get(Self::slot_index(id)?)?.as_ref()
    }

    pub fn get_mut(&mut self, id: Id<Tag>) -> Option<&mut T> {
        self.slots.get_mut(Self::slot_index(id)?)?.as_mut()
    }

    pub fn contains(&self, id: Id<Tag>) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: Id<Tag>) -> Option<T> {
        let value = self.slots.get_mut(Self::slot_index(id)?)?.take()?;
        self.live -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter_ordered(&self) -> impl Iterator<Item = (Id<Tag>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.as_ref()?;
            Some((Id::new(index as u32 + 1), value))
        })
    }

    pub fn iter_ordered_mut(&mut self) -> impl Iterator<Item = (Id<Tag>, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let value = slot.as_mut()?;
                Some((Id::new(index as u32 + 1), value))
            })
    }
}
