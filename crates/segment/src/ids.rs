use uuid::Uuid;

use crate::token::TokenId;

/// Source of fresh token ids.
///
/// The document model owns one generator per session, so tests can plug in a
/// deterministic sequence instead of random ids.
pub trait IdGenerator {
    /// Returns an id never returned before by this generator.
    fn next_id(&mut self) -> TokenId;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self) -> TokenId {
        (**self).next_id()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> TokenId {
        (**self).next_id()
    }
}

/// Deterministic `"<prefix>-<n>"` ids, counting from 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("tok")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> TokenId {
        let id = TokenId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// Random UUIDv4-backed ids for interactive sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> TokenId {
        TokenId::new(format!("tok-{}", Uuid::new_v4().simple()))
    }
}
