// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode: immutable run-time description of an IDL type.
//!
//! A [`TypeCode`] is a cheap, clonable handle to one node of an immutable
//! type graph. Each node variant carries only the fields that are valid for
//! its kind; the kind-erased accessors (`id()`, `member_count()`,
//! `content_type()`...) report [`Error::WrongKind`] when called on a kind
//! that has no such field and [`Error::IndexOutOfRange`] for bad member
//! indices.
//!
//! # Recursive types
//!
//! Self-referential types are built in two phases: a placeholder created
//! with [`TypeCode::recursive`] names the repository id of the aggregate it
//! stands for, and building that aggregate (struct, union, exception or
//! value type with the same id) binds every matching placeholder reachable
//! through a sequence. Nodes live in a shared arena and a bound placeholder
//! stores the index of its target, so every handle taken out of the graph
//! keeps the whole graph alive.
//!
//! ```rust
//! use idl_any::typecode::{StructMember, TCKind, TypeCode};
//!
//! let placeholder = TypeCode::recursive("IDL:Node:1.0");
//! assert_eq!(placeholder.kind(), TCKind::Recursive);
//!
//! let node = TypeCode::struct_tc(
//!     "IDL:Node:1.0",
//!     "Node",
//!     vec![StructMember::new("children", TypeCode::sequence(0, placeholder))],
//! );
//!
//! let children = node.member_type(0).unwrap();
//! drop(node);
//! let element = children.content_type().unwrap();
//! assert!(element.is_recursive());
//! assert_eq!(element.kind(), TCKind::Struct);
//! assert_eq!(element.member_count().unwrap(), 1);
//! ```

mod compact;
mod compare;
mod display;
mod factory;
mod kind;
mod members;

pub use factory::OBJECT_REPOSITORY_ID;
pub use kind::{ParamLayout, TCKind};
pub use members::{StructMember, UnionLabel, UnionMember, ValueMember, ValueModifier, Visibility};

use crate::any::Value;
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Index of a node inside its [`Graph`].
pub(crate) type NodeId = usize;

/// Repository id and name shared by all identified kinds.
#[derive(Debug, Clone, Default)]
pub(crate) struct Named {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl Named {
    pub(crate) fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Struct or exception member inside the arena.
#[derive(Debug, Clone)]
pub(crate) struct Field {
    pub(crate) name: String,
    pub(crate) ty: NodeId,
}

/// Union branch inside the arena.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
    pub(crate) name: String,
    pub(crate) label: UnionLabel,
    pub(crate) ty: NodeId,
}

/// Value type state member inside the arena.
#[derive(Debug, Clone)]
pub(crate) struct StateField {
    pub(crate) name: String,
    pub(crate) ty: NodeId,
    pub(crate) visibility: Visibility,
}

/// TypeCode node. One variant per parameter shape; nested types are
/// indices into the owning graph.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Kinds without parameters (primitives, any, typecode, principal).
    Basic(TCKind),
    String {
        bound: u32,
    },
    WString {
        bound: u32,
    },
    Fixed {
        digits: u16,
        scale: i16,
    },
    ObjRef(Named),
    Native(Named),
    AbstractInterface(Named),
    Struct {
        named: Named,
        members: Vec<Field>,
    },
    Except {
        named: Named,
        members: Vec<Field>,
    },
    Union {
        named: Named,
        discriminator: NodeId,
        members: Vec<Branch>,
        default_index: i32,
    },
    Enum {
        named: Named,
        members: Vec<String>,
    },
    Sequence {
        bound: u32,
        content: NodeId,
    },
    Array {
        length: u32,
        content: NodeId,
    },
    Alias {
        named: Named,
        content: NodeId,
    },
    ValueBox {
        named: Named,
        content: NodeId,
    },
    Value {
        named: Named,
        modifier: ValueModifier,
        concrete_base: Option<NodeId>,
        members: Vec<StateField>,
    },
    /// Placeholder for the aggregate with repository id `id`; `target` is
    /// set once that aggregate is built around it.
    Recursive {
        id: String,
        target: Option<NodeId>,
    },
}

impl Node {
    /// Kind of this node (placeholders report `Recursive`).
    pub(crate) fn kind(&self) -> TCKind {
        match self {
            Node::Basic(kind) => *kind,
            Node::String { .. } => TCKind::String,
            Node::WString { .. } => TCKind::WString,
            Node::Fixed { .. } => TCKind::Fixed,
            Node::ObjRef(_) => TCKind::ObjRef,
            Node::Native(_) => TCKind::Native,
            Node::AbstractInterface(_) => TCKind::AbstractInterface,
            Node::Struct { .. } => TCKind::Struct,
            Node::Except { .. } => TCKind::Except,
            Node::Union { .. } => TCKind::Union,
            Node::Enum { .. } => TCKind::Enum,
            Node::Sequence { .. } => TCKind::Sequence,
            Node::Array { .. } => TCKind::Array,
            Node::Alias { .. } => TCKind::Alias,
            Node::ValueBox { .. } => TCKind::ValueBox,
            Node::Value { .. } => TCKind::Value,
            Node::Recursive { .. } => TCKind::Recursive,
        }
    }

    pub(crate) fn named(&self) -> Option<&Named> {
        match self {
            Node::ObjRef(named)
            | Node::Native(named)
            | Node::AbstractInterface(named)
            | Node::Struct { named, .. }
            | Node::Except { named, .. }
            | Node::Union { named, .. }
            | Node::Enum { named, .. }
            | Node::Alias { named, .. }
            | Node::ValueBox { named, .. }
            | Node::Value { named, .. } => Some(named),
            _ => None,
        }
    }

    fn member_count(&self) -> Option<usize> {
        match self {
            Node::Struct { members, .. } | Node::Except { members, .. } => Some(members.len()),
            Node::Union { members, .. } => Some(members.len()),
            Node::Enum { members, .. } => Some(members.len()),
            Node::Value { members, .. } => Some(members.len()),
            _ => None,
        }
    }
}

/// Immutable arena holding every node of one type graph.
#[derive(Debug)]
pub(crate) struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Shared handle to one node of an immutable type graph.
///
/// Cloning is a reference-count increment. Equality (`==`) is
/// [`TypeCode::equal`].
#[derive(Clone)]
pub struct TypeCode {
    graph: Arc<Graph>,
    node: NodeId,
}

impl TypeCode {
    pub(crate) fn from_graph(graph: Arc<Graph>, node: NodeId) -> Self {
        Self { graph, node }
    }

    /// TypeCode made of a single node without nested types.
    pub(crate) fn leaf(node: Node) -> Self {
        Self::from_graph(Arc::new(Graph::new(vec![node])), 0)
    }

    pub(crate) fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub(crate) fn node_id(&self) -> NodeId {
        self.node
    }

    pub(crate) fn node(&self) -> &Node {
        self.graph.node(self.node)
    }

    /// Handle to another node of the same graph.
    pub(crate) fn link(&self, node: NodeId) -> TypeCode {
        Self::from_graph(Arc::clone(&self.graph), node)
    }

    pub(crate) fn as_ptr(&self) -> *const Node {
        self.node()
    }

    /// Follow a bound placeholder to its target.
    pub(crate) fn resolved(&self) -> Result<TypeCode> {
        match self.node() {
            Node::Recursive {
                target: Some(target),
                ..
            } => Ok(self.link(*target)),
            Node::Recursive { id, target: None } => Err(Error::NotYetResolved { id: id.clone() }),
            _ => Ok(self.clone()),
        }
    }

    /// Strip placeholders and aliases until a concrete kind is reached.
    pub(crate) fn unaliased(&self) -> Result<TypeCode> {
        let mut current = self.resolved()?;
        loop {
            let next = match current.node() {
                Node::Alias { content, .. } => current.link(*content).resolved()?,
                _ => return Ok(current),
            };
            current = next;
        }
    }

    /// Run `f` against the resolved node; `None` means the field does not
    /// exist for this kind.
    fn query<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&TypeCode, &Node) -> Option<Result<T>>,
    ) -> Result<T> {
        let tc = self.resolved()?;
        let node = tc.node();
        f(&tc, node).unwrap_or_else(|| Err(Error::wrong_kind(op, node.kind())))
    }

    fn check_index(index: usize, count: usize) -> Result<()> {
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }
        Ok(())
    }

    /// Kind of the described type.
    ///
    /// An unresolved placeholder reports [`TCKind::Recursive`]; once bound
    /// it reports its target's kind.
    pub fn kind(&self) -> TCKind {
        match self.node() {
            Node::Recursive {
                target: Some(target),
                ..
            } => self.graph.node(*target).kind(),
            node => node.kind(),
        }
    }

    /// True if this TypeCode is a recursive placeholder (bound or not).
    pub fn is_recursive(&self) -> bool {
        matches!(self.node(), Node::Recursive { .. })
    }

    /// Repository id a placeholder stands for. Valid for placeholders only,
    /// before and after resolution.
    pub fn recursive_id(&self) -> Result<&str> {
        match self.node() {
            Node::Recursive { id, .. } => Ok(id.as_str()),
            node => Err(Error::wrong_kind("recursive_id", node.kind())),
        }
    }

    /// Repository id.
    ///
    /// Valid for objref, struct, union, enum, alias, exception, value,
    /// value box, native and abstract interface.
    pub fn id(&self) -> Result<String> {
        self.query("id", |_, node| node.named().map(|n| Ok(n.id.clone())))
    }

    /// Unscoped type name. Valid for the same kinds as [`TypeCode::id`].
    pub fn name(&self) -> Result<String> {
        self.query("name", |_, node| node.named().map(|n| Ok(n.name.clone())))
    }

    /// Number of members. Valid for struct, union, enum, exception and value.
    pub fn member_count(&self) -> Result<usize> {
        self.query("member_count", |_, node| node.member_count().map(Ok))
    }

    /// Name of member `index`.
    pub fn member_name(&self, index: usize) -> Result<String> {
        self.query("member_name", |_, node| {
            let name = match node {
                Node::Struct { members, .. } | Node::Except { members, .. } => {
                    members.get(index).map(|m| &m.name)
                }
                Node::Union { members, .. } => members.get(index).map(|m| &m.name),
                Node::Enum { members, .. } => members.get(index),
                Node::Value { members, .. } => members.get(index).map(|m| &m.name),
                _ => return None,
            };
            let count = node.member_count().unwrap_or(0);
            Some(
                name.cloned()
                    .ok_or(Error::IndexOutOfRange { index, count }),
            )
        })
    }

    /// Type of member `index`. Valid for struct, union, exception and value.
    pub fn member_type(&self, index: usize) -> Result<TypeCode> {
        self.query("member_type", |tc, node| {
            let member = match node {
                Node::Struct { members, .. } | Node::Except { members, .. } => {
                    members.get(index).map(|m| m.ty)
                }
                Node::Union { members, .. } => members.get(index).map(|m| m.ty),
                Node::Value { members, .. } => members.get(index).map(|m| m.ty),
                _ => return None,
            };
            let count = node.member_count().unwrap_or(0);
            Some(
                member
                    .map(|ty| tc.link(ty))
                    .ok_or(Error::IndexOutOfRange { index, count }),
            )
        })
    }

    /// Label of union branch `index`; the default branch yields
    /// [`UnionLabel::Default`].
    pub fn member_label(&self, index: usize) -> Result<UnionLabel> {
        self.query("member_label", |_, node| match node {
            Node::Union { members, .. } => Some(
                Self::check_index(index, members.len()).map(|()| members[index].label.clone()),
            ),
            _ => None,
        })
    }

    /// Discriminator type. Union only.
    pub fn discriminator_type(&self) -> Result<TypeCode> {
        self.query("discriminator_type", |tc, node| match node {
            Node::Union { discriminator, .. } => Some(Ok(tc.link(*discriminator))),
            _ => None,
        })
    }

    /// Index of the default branch, or -1. Union only.
    pub fn default_index(&self) -> Result<i32> {
        self.query("default_index", |_, node| match node {
            Node::Union { default_index, .. } => Some(Ok(*default_index)),
            _ => None,
        })
    }

    /// Bound (0 = unbounded) for string, wstring and sequence; element count
    /// for array.
    pub fn length(&self) -> Result<u32> {
        self.query("length", |_, node| match node {
            Node::String { bound } | Node::WString { bound } => Some(Ok(*bound)),
            Node::Sequence { bound, .. } => Some(Ok(*bound)),
            Node::Array { length, .. } => Some(Ok(*length)),
            _ => None,
        })
    }

    /// Element, aliased or boxed type. Valid for sequence, array, alias and
    /// value box.
    pub fn content_type(&self) -> Result<TypeCode> {
        self.query("content_type", |tc, node| match node {
            Node::Sequence { content, .. }
            | Node::Array { content, .. }
            | Node::Alias { content, .. }
            | Node::ValueBox { content, .. } => Some(Ok(tc.link(*content))),
            _ => None,
        })
    }

    /// Total number of decimal digits. Fixed only.
    pub fn fixed_digits(&self) -> Result<u16> {
        self.query("fixed_digits", |_, node| match node {
            Node::Fixed { digits, .. } => Some(Ok(*digits)),
            _ => None,
        })
    }

    /// Position of the decimal point. Fixed only.
    pub fn fixed_scale(&self) -> Result<i16> {
        self.query("fixed_scale", |_, node| match node {
            Node::Fixed { scale, .. } => Some(Ok(*scale)),
            _ => None,
        })
    }

    /// Value type modifier. Value only.
    pub fn type_modifier(&self) -> Result<ValueModifier> {
        self.query("type_modifier", |_, node| match node {
            Node::Value { modifier, .. } => Some(Ok(*modifier)),
            _ => None,
        })
    }

    /// Concrete base value type, if any. Value only.
    pub fn concrete_base_type(&self) -> Result<Option<TypeCode>> {
        self.query("concrete_base_type", |tc, node| match node {
            Node::Value { concrete_base, .. } => {
                Some(Ok((*concrete_base).map(|id| tc.link(id))))
            }
            _ => None,
        })
    }

    /// Visibility of state member `index`. Value only.
    pub fn member_visibility(&self, index: usize) -> Result<Visibility> {
        self.query("member_visibility", |_, node| match node {
            Node::Value { members, .. } => Some(
                Self::check_index(index, members.len()).map(|()| members[index].visibility),
            ),
            _ => None,
        })
    }

    /// Index of the union branch selected by `discriminator`: a label
    /// match, else the default branch, else `None`.
    pub fn member_index_for(&self, discriminator: &Value) -> Result<Option<usize>> {
        self.query("member_index_for", |_, node| match node {
            Node::Union {
                members,
                default_index,
                ..
            } => {
                let explicit = members.iter().position(|m| match &m.label {
                    UnionLabel::Value(label) => label == discriminator,
                    UnionLabel::Default => false,
                });
                let fallback = usize::try_from(*default_index).ok();
                Some(Ok(explicit.or(fallback)))
            }
            _ => None,
        })
    }
}

impl PartialEq for TypeCode {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeCode({})", self)
    }
}
