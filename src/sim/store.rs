//! Ordered collection of live ideas

use super::state::{Idea, IdeaId};

/// Live ideas in creation order, unique by id
#[derive(Debug, Clone, Default)]
pub struct IdeaStore {
    ideas: Vec<Idea>,
    next_local: u64,
}

impl IdeaStore {
    pub fn new() -> Self {
        Self {
            ideas: Vec::new(),
            next_local: 1,
        }
    }

    /// Allocate a fresh local id
    pub fn next_local_id(&mut self) -> IdeaId {
        let id = match self.next_local.max(1) {
            n if !self.contains(&IdeaId::Local(n)) => n,
            // Counter pinned at u64::MAX by a restored id
            _ => self.lowest_free_local(),
        };
        self.next_local = id.saturating_add(1);
        IdeaId::Local(id)
    }

    /// Make sure future local ids never collide with `id`
    pub fn reserve(&mut self, id: &IdeaId) {
        if let IdeaId::Local(n) = id {
            self.next_local = self.next_local.max(n.saturating_add(1));
        }
    }

    fn lowest_free_local(&self) -> u64 {
        (1..=u64::MAX)
            .find(|n| !self.contains(&IdeaId::Local(*n)))
            .unwrap_or(1)
    }

    /// Insert an idea; returns false (and drops it) if the id is already live
    pub fn insert(&mut self, idea: Idea) -> bool {
        if self.contains(&idea.id) {
            return false;
        }
        self.reserve(&idea.id);
        self.ideas.push(idea);
        true
    }

    pub fn remove(&mut self, id: &IdeaId) -> Option<Idea> {
        let index = self.index_of(id)?;
        Some(self.ideas.remove(index))
    }

    pub fn contains(&self, id: &IdeaId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &IdeaId) -> Option<usize> {
        self.ideas.iter().position(|i| &i.id == id)
    }

    pub fn get(&self, id: &IdeaId) -> Option<&Idea> {
        self.ideas.iter().find(|i| &i.id == id)
    }

    pub fn get_mut(&mut self, id: &IdeaId) -> Option<&mut Idea> {
        self.ideas.iter_mut().find(|i| &i.id == id)
    }

    /// True if a live idea has this exact text at this exact position
    pub fn has_signature(&self, text: &str, x: f32, y: f32) -> bool {
        self.ideas
            .iter()
            .any(|i| i.pos.x == x && i.pos.y == y && i.text() == text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Idea> {
        self.ideas.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Idea> {
        self.ideas.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Idea] {
        &mut self.ideas
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    /// Remove every idea; the id sequence keeps counting
    pub fn clear(&mut self) {
        self.ideas.clear();
    }

    pub fn ids(&self) -> Vec<IdeaId> {
        self.ideas.iter().map(|i| i.id.clone()).collect()
    }

    /// Highest stacking order currently in use
    pub fn top_z(&self) -> u32 {
        self.ideas.iter().map(|i| i.z).max().unwrap_or(0)
    }
}
