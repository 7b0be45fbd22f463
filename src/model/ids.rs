// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// An identifier that ends up as an element id on the display surface.
///
/// Ids must be non-empty and free of whitespace so they can be matched by prefix when stray
/// nodes are swept from the surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id(&value)?;
        Ok(Self { value, _marker: PhantomData })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain whitespace")]
    ContainsWhitespace,
}

fn validate_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.chars().any(char::is_whitespace) {
        return Err(IdError::ContainsWhitespace);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstanceIdTag {}
/// Identifies one output-view instance; all of its render ids share this as a namespace.
pub type InstanceId = Id<InstanceIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderIdTag {}
/// Identifies one render session; used verbatim as the root element id of its artifact.
pub type RenderId = Id<RenderIdTag>;

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

impl InstanceId {
    /// Allocates a process-unique instance id (`cl-1`, `cl-2`, ...).
    pub fn next() -> Self {
        let n = INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        Self { value: format!("cl-{n}"), _marker: PhantomData }
    }

    /// Prefix shared by every render id of this instance.
    ///
    /// The trailing `-` keeps `cl-1` from matching ids that belong to `cl-10`.
    pub fn namespace(&self) -> String {
        format!("{}-", self.value)
    }

    pub fn render_id(&self, seq: u64) -> RenderId {
        RenderId { value: format!("{}{seq}", self.namespace()), _marker: PhantomData }
    }
}
