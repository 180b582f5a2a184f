use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Marks what an [`Id`] identifies, so task and node ids cannot be mixed up.
pub trait IdKind {
    const LABEL: &'static str;
}

/// Caller supplied, human readable identifier.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize)]
#[serde(transparent)]
pub struct Id<T> {
    id: String,
    #[serde(skip)]
    kind: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Id { id: id.into(), kind: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl<T: IdKind> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", T::LABEL, self.id)
    }
}

impl<T> From<&str> for Id<T> {
    fn from(id: &str) -> Self {
        Id::new(id)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id: Id<T>) -> Self {
        id.id
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct TaskKind;

impl IdKind for TaskKind {
    const LABEL: &'static str = "TaskId";
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct NodeKind;

impl IdKind for NodeKind {
    const LABEL: &'static str = "NodeId";
}

pub type TaskId = Id<TaskKind>;
pub type NodeId = Id<NodeKind>;
