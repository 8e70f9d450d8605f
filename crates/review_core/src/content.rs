use std::collections::BTreeMap;

use crate::ReviewError;

/// One of the four independently loaded content fields of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Original,
    Spun,
    ReviewComments,
    Screenshot,
}

impl Slot {
    pub const ALL: [Slot; 4] = [
        Slot::Original,
        Slot::Spun,
        Slot::ReviewComments,
        Slot::Screenshot,
    ];

    pub fn is_text(self) -> bool {
        !matches!(self, Slot::Screenshot)
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Original => "Original Chapter",
            Slot::Spun => "AI Generated Version",
            Slot::ReviewComments => "AI Review Comments",
            Slot::Screenshot => "Original Chapter Screenshot",
        }
    }
}

/// Reference to a decoded screenshot held by the engine's image registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: u64,
    pub byte_len: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Text(String),
    Image(ImageHandle),
}

impl SlotValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(text) => Some(text),
            SlotValue::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageHandle> {
        match self {
            SlotValue::Image(handle) => Some(handle),
            SlotValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotState {
    pub value: Option<SlotValue>,
    pub is_loading: bool,
    pub error: Option<ReviewError>,
    generation: u64,
}

impl SlotState {
    fn new() -> Self {
        Self {
            value: None,
            is_loading: true,
            error: None,
            generation: 0,
        }
    }
}

/// What happened when a fetch result was offered to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Settled {
    /// The result belonged to the newest request and was applied. Carries the
    /// image it displaced, if any.
    Applied { displaced: Option<ImageHandle> },
    /// A newer request for the slot exists. Carries the unused image, if any.
    Stale { orphan: Option<ImageHandle> },
}

/// Client-side cache of the four content slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStore {
    slots: BTreeMap<Slot, SlotState>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self {
            slots: Slot::ALL.into_iter().map(|s| (s, SlotState::new())).collect(),
        }
    }
}

impl ContentStore {
    pub fn slot(&self, slot: Slot) -> &SlotState {
        // Every slot is inserted at construction and never removed.
        &self.slots[&slot]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &SlotState)> {
        self.slots.iter().map(|(slot, state)| (*slot, state))
    }

    pub fn text(&self, slot: Slot) -> Option<&str> {
        self.slot(slot).value.as_ref().and_then(SlotValue::as_text)
    }

    pub fn settled_count(&self) -> usize {
        self.slots.values().filter(|s| !s.is_loading).count()
    }

    fn entry(&mut self, slot: Slot) -> &mut SlotState {
        self.slots.entry(slot).or_insert_with(SlotState::new)
    }

    /// Marks the slot loading and returns the generation of the new request.
    pub(crate) fn begin(&mut self, slot: Slot) -> u64 {
        let entry = self.entry(slot);
        entry.generation += 1;
        entry.is_loading = true;
        entry.error = None;
        entry.generation
    }

    pub(crate) fn settle(
        &mut self,
        slot: Slot,
        generation: u64,
        result: Result<SlotValue, ReviewError>,
    ) -> Settled {
        let entry = self.entry(slot);
        if generation != entry.generation {
            let orphan = match result {
                Ok(SlotValue::Image(handle)) => Some(handle),
                _ => None,
            };
            return Settled::Stale { orphan };
        }

        let mut displaced = None;
        match result {
            Ok(value) => {
                let previous = entry.value.replace(value);
                if let Some(SlotValue::Image(old)) = previous {
                    displaced = Some(old);
                }
                entry.error = None;
            }
            Err(err) => {
                entry.error = Some(err);
            }
        }
        entry.is_loading = false;
        Settled::Applied { displaced }
    }

    /// Drops the screenshot handle and invalidates every in-flight request.
    pub(crate) fn teardown(&mut self) -> Option<ImageHandle> {
        let mut released = None;
        for state in self.slots.values_mut() {
            state.generation += 1;
            state.is_loading = false;
            if let Some(SlotValue::Image(handle)) = &state.value {
                released = Some(handle.clone());
                state.value = None;
            }
        }
        released
    }
}
