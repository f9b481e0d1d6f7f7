//! Raw input rows, exactly as read from the external record list.
//!
//! Every field except `name` may be missing. Values are untrimmed; all
//! interpretation happens in [`resolve`](crate::resolve).

/// One row of the external record list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
  pub name:            String,
  pub father_name:     Option<String>,
  pub gender:          Option<String>,
  pub generation:      Option<String>,
  pub generation_name: Option<String>,
  pub spouse:          Option<String>,
  pub birth_date:      Option<String>,
  pub death_date:      Option<String>,
  pub birth_place:     Option<String>,
  pub death_place:     Option<String>,
  pub bio:             Option<String>,
  pub portrait_path:   Option<String>,
}

impl RawRecord {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn with_father(mut self, father_name: impl Into<String>) -> Self {
    self.father_name = Some(father_name.into());
    self
  }

  pub fn with_generation(mut self, generation: impl ToString) -> Self {
    self.generation = Some(generation.to_string());
    self
  }

  pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
    self.bio = Some(bio.into());
    self
  }
}
