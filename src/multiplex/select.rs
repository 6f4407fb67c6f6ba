// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::model::{Message, Variant};

/// Which messages a [`SelectCriteria`] matches.
pub enum Filter {
    All,
    /// The message with this name (served through the table index)
    Name(String),
    HasAttribute(String),
    AttributeEquals(String, Variant),
    Predicate(Box<dyn Fn(&Message) -> bool + Send + Sync>),
}

impl Filter {
    pub fn predicate(f: impl Fn(&Message) -> bool + Send + Sync + 'static) -> Self {
        Filter::Predicate(Box::new(f))
    }

    pub(crate) fn accepts(&self, message: &Message) -> bool {
        match self {
            Filter::All => true,
            Filter::Name(name) => message.name() == name,
            Filter::HasAttribute(attr) => message.attribute(attr).is_some(),
            Filter::AttributeEquals(attr, value) => message.attribute(attr) == Some(value),
            Filter::Predicate(f) => f(message),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "All"),
            Filter::Name(name) => write!(f, "Name({:?})", name),
            Filter::HasAttribute(attr) => write!(f, "HasAttribute({:?})", attr),
            Filter::AttributeEquals(attr, value) => write!(f, "AttributeEquals({:?}, {:?})", attr, value),
            Filter::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// Input and output of a table `select`.
///
/// The table writes the matching messages, projected when a projection is set,
/// into `matches`, replacing whatever a previous select left there. An empty
/// result is a normal outcome.
#[derive(Debug)]
pub struct SelectCriteria {
    pub filter: Filter,
    pub projection: Option<Vec<String>>,
    matches: Vec<Message>,
}

impl SelectCriteria {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            projection: None,
            matches: Vec::new(),
        }
    }

    pub fn with_projection<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self) -> &[Message] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<Message> {
        self.matches
    }

    pub(crate) fn clear(&mut self) {
        self.matches.clear();
    }

    pub(crate) fn push(&mut self, message: &Message) {
        let selected = match &self.projection {
            Some(names) => message.project(names),
            None => message.clone(),
        };
        self.matches.push(selected);
    }
}
