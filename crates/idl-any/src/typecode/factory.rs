// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode constructors, one per kind, plus the canonical primitive table.
//!
//! Every constructor copies the graphs of its nested TypeCodes into one new
//! arena. Aggregates that carry a repository id (struct, exception, union,
//! value) then bind the placeholders with the same id that the copy
//! contains.

use super::{Branch, Field, Graph, Named, Node, NodeId, StateField, TCKind, TypeCode};
use super::{ParamLayout, StructMember, UnionLabel, UnionMember, ValueMember, ValueModifier};
use crate::any::check;
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Repository id of the canonical `CORBA::Object` reference TypeCode.
pub const OBJECT_REPOSITORY_ID: &str = "IDL:omg.org/CORBA/Object:1.0";

const OBJECT_NAME: &str = "Object";

/// Canonical TypeCodes indexed by wire kind.
struct PrimitiveTable {
    slots: Vec<Option<TypeCode>>,
}

impl PrimitiveTable {
    fn build() -> Self {
        let slots = TCKind::ALL
            .iter()
            .map(|&kind| match kind.param_layout() {
                ParamLayout::Empty => Some(TypeCode::leaf(Node::Basic(kind))),
                _ => match kind {
                    TCKind::String => Some(TypeCode::string(0)),
                    TCKind::WString => Some(TypeCode::wstring(0)),
                    TCKind::ObjRef => Some(TypeCode::object_ref(OBJECT_REPOSITORY_ID, OBJECT_NAME)),
                    _ => None,
                },
            })
            .collect();
        log::debug!("[typecode] primitive table initialized");
        Self { slots }
    }

    fn get(&self, kind: TCKind) -> Option<&TypeCode> {
        self.slots.get(kind.to_u32() as usize)?.as_ref()
    }
}

fn primitive_table() -> &'static PrimitiveTable {
    static TABLE: OnceLock<PrimitiveTable> = OnceLock::new();
    TABLE.get_or_init(PrimitiveTable::build)
}

/// Collects the nodes of a new graph.
///
/// Imported TypeCodes are copied node by node; a node reached twice (shared
/// subtree or bound placeholder target) is copied once.
struct GraphBuilder {
    nodes: Vec<Node>,
    imported: HashMap<(*const Graph, NodeId), NodeId>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            imported: HashMap::new(),
        }
    }

    fn import(&mut self, tc: &TypeCode) -> NodeId {
        let key = (Arc::as_ptr(tc.graph()), tc.node_id());
        if let Some(&id) = self.imported.get(&key) {
            return id;
        }
        // Reserve the slot first so cycles through placeholder targets
        // land on it.
        let slot = self.nodes.len();
        self.nodes.push(Node::Basic(TCKind::Null));
        self.imported.insert(key, slot);
        let node = tc.node().clone().map_links(|link| self.import(&tc.link(link)));
        self.nodes[slot] = node;
        slot
    }

    fn finish(mut self, root: Node) -> TypeCode {
        let id = self.nodes.len();
        self.nodes.push(root);
        TypeCode::from_graph(Arc::new(Graph::new(self.nodes)), id)
    }

    /// Push `root` and bind the placeholders named after it.
    fn aggregate(mut self, root: Node) -> TypeCode {
        let id = self.nodes.len();
        let repository_id = root.named().map(|n| n.id.clone()).unwrap_or_default();
        self.nodes.push(root);
        if !repository_id.is_empty() {
            bind_placeholders(&mut self.nodes, id, &repository_id);
        }
        TypeCode::from_graph(Arc::new(Graph::new(self.nodes)), id)
    }
}

impl TypeCode {
    /// Canonical shared TypeCode for a parameterless kind.
    ///
    /// Also accepts `String`/`WString` (unbounded) and `ObjRef`
    /// (`CORBA::Object`). Every call for the same kind returns the same
    /// shared node.
    pub fn primitive(kind: TCKind) -> Result<TypeCode> {
        primitive_table()
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::wrong_kind("primitive", kind))
    }

    /// Canonical TypeCode for a kind known to be in the primitive table.
    pub(crate) fn canonical(kind: TCKind) -> TypeCode {
        match primitive_table().get(kind) {
            Some(tc) => tc.clone(),
            None => TypeCode::leaf(Node::Basic(kind)),
        }
    }

    /// The `tk_null` TypeCode.
    pub fn null() -> TypeCode {
        Self::canonical(TCKind::Null)
    }

    /// `string` (bound 0) or `string<bound>`.
    pub fn string(bound: u32) -> TypeCode {
        TypeCode::leaf(Node::String { bound })
    }

    /// `wstring` (bound 0) or `wstring<bound>`.
    pub fn wstring(bound: u32) -> TypeCode {
        TypeCode::leaf(Node::WString { bound })
    }

    /// `fixed<digits, scale>`.
    pub fn fixed(digits: u16, scale: i16) -> TypeCode {
        TypeCode::leaf(Node::Fixed { digits, scale })
    }

    /// Interface (object reference) TypeCode.
    pub fn object_ref(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        TypeCode::leaf(Node::ObjRef(Named::new(id, name)))
    }

    pub fn native(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        TypeCode::leaf(Node::Native(Named::new(id, name)))
    }

    pub fn abstract_interface(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        TypeCode::leaf(Node::AbstractInterface(Named::new(id, name)))
    }

    /// Struct TypeCode. Binds placeholders whose id is `id`.
    pub fn struct_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<StructMember>,
    ) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let members = fields(&mut builder, &members);
        builder.aggregate(Node::Struct {
            named: Named::new(id, name),
            members,
        })
    }

    /// Exception TypeCode. Same shape as a struct.
    pub fn exception_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<StructMember>,
    ) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let members = fields(&mut builder, &members);
        builder.aggregate(Node::Except {
            named: Named::new(id, name),
            members,
        })
    }

    /// Union TypeCode.
    ///
    /// The discriminator (after alias resolution) must be an integer,
    /// boolean, char, wchar or enum kind; otherwise `WrongKind`. Every
    /// explicit label must be a value of the discriminator type and at most
    /// one branch may be the default branch; otherwise `WrongValueKind`.
    pub fn union_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        discriminator: TypeCode,
        members: Vec<UnionMember>,
    ) -> Result<TypeCode> {
        let kind = discriminator.unaliased()?.kind();
        if !kind.is_discriminator() {
            return Err(Error::wrong_kind("union_tc", kind));
        }

        let mut defaults = 0;
        for member in &members {
            match &member.label {
                UnionLabel::Default => defaults += 1,
                UnionLabel::Value(label) => check::conforms(&discriminator, label)?,
            }
        }
        if defaults > 1 {
            return Err(Error::value_kind(
                "at most one default label",
                format!("{} default labels", defaults),
            ));
        }

        Ok(Self::union_unchecked(
            Named::new(id, name),
            discriminator,
            members,
        ))
    }

    pub(crate) fn union_unchecked(
        named: Named,
        discriminator: TypeCode,
        members: Vec<UnionMember>,
    ) -> TypeCode {
        let default_index = members
            .iter()
            .position(|m| m.label.is_default())
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(-1);
        let mut builder = GraphBuilder::new();
        let discriminator = builder.import(&discriminator);
        let members = members
            .iter()
            .map(|m| Branch {
                name: m.name.clone(),
                label: m.label.clone(),
                ty: builder.import(&m.type_code),
            })
            .collect();
        builder.aggregate(Node::Union {
            named,
            discriminator,
            members,
            default_index,
        })
    }

    /// Enum TypeCode from its enumerator names, in ordinal order.
    pub fn enum_tc<I, S>(id: impl Into<String>, name: impl Into<String>, members: I) -> TypeCode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeCode::leaf(Node::Enum {
            named: Named::new(id, name),
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    /// `sequence<content>` (bound 0) or `sequence<content, bound>`.
    pub fn sequence(bound: u32, content: TypeCode) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let content = builder.import(&content);
        builder.finish(Node::Sequence { bound, content })
    }

    /// Fixed-length array of `length` elements.
    pub fn array(length: u32, content: TypeCode) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let content = builder.import(&content);
        builder.finish(Node::Array { length, content })
    }

    /// Typedef of `content`.
    pub fn alias(id: impl Into<String>, name: impl Into<String>, content: TypeCode) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let content = builder.import(&content);
        builder.finish(Node::Alias {
            named: Named::new(id, name),
            content,
        })
    }

    /// Value type TypeCode. Binds placeholders whose id is `id`.
    pub fn value_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        modifier: ValueModifier,
        concrete_base: Option<TypeCode>,
        members: Vec<ValueMember>,
    ) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let concrete_base = concrete_base.map(|base| builder.import(&base));
        let members = members
            .iter()
            .map(|m| StateField {
                name: m.name.clone(),
                ty: builder.import(&m.type_code),
                visibility: m.visibility,
            })
            .collect();
        builder.aggregate(Node::Value {
            named: Named::new(id, name),
            modifier,
            concrete_base,
            members,
        })
    }

    pub fn value_box(id: impl Into<String>, name: impl Into<String>, content: TypeCode) -> TypeCode {
        let mut builder = GraphBuilder::new();
        let content = builder.import(&content);
        builder.finish(Node::ValueBox {
            named: Named::new(id, name),
            content,
        })
    }

    /// Recursive placeholder for the aggregate with repository id `id`.
    ///
    /// The placeholder itself never changes. Building an aggregate with
    /// that id around a sequence that contains it binds the aggregate's
    /// copy, so the resolved placeholder is reached through the aggregate's
    /// members.
    pub fn recursive(id: impl Into<String>) -> TypeCode {
        TypeCode::leaf(Node::Recursive {
            id: id.into(),
            target: None,
        })
    }
}

fn fields(builder: &mut GraphBuilder, members: &[StructMember]) -> Vec<Field> {
    members
        .iter()
        .map(|m| Field {
            name: m.name.clone(),
            ty: builder.import(&m.type_code),
        })
        .collect()
}

impl Node {
    /// Visit every directly nested node. Placeholder targets are not
    /// children.
    pub(crate) fn for_each_child(&self, mut f: impl FnMut(NodeId)) {
        match self {
            Node::Struct { members, .. } | Node::Except { members, .. } => {
                members.iter().for_each(|m| f(m.ty));
            }
            Node::Union {
                discriminator,
                members,
                ..
            } => {
                f(*discriminator);
                members.iter().for_each(|m| f(m.ty));
            }
            Node::Sequence { content, .. }
            | Node::Array { content, .. }
            | Node::Alias { content, .. }
            | Node::ValueBox { content, .. } => f(*content),
            Node::Value {
                concrete_base,
                members,
                ..
            } => {
                if let Some(base) = concrete_base {
                    f(*base);
                }
                members.iter().for_each(|m| f(m.ty));
            }
            _ => {}
        }
    }

    /// Rewrite every link, placeholder target included.
    fn map_links(mut self, mut f: impl FnMut(NodeId) -> NodeId) -> Node {
        match &mut self {
            Node::Struct { members, .. } | Node::Except { members, .. } => {
                members.iter_mut().for_each(|m| m.ty = f(m.ty));
            }
            Node::Union {
                discriminator,
                members,
                ..
            } => {
                *discriminator = f(*discriminator);
                members.iter_mut().for_each(|m| m.ty = f(m.ty));
            }
            Node::Sequence { content, .. }
            | Node::Array { content, .. }
            | Node::Alias { content, .. }
            | Node::ValueBox { content, .. } => *content = f(*content),
            Node::Value {
                concrete_base,
                members,
                ..
            } => {
                if let Some(base) = concrete_base {
                    *base = f(*base);
                }
                members.iter_mut().for_each(|m| m.ty = f(m.ty));
            }
            Node::Recursive {
                target: Some(target),
                ..
            } => *target = f(*target),
            _ => {}
        }
        self
    }
}

/// Bind unbound placeholders named `id` that are nested in `root`.
///
/// Only placeholders reached through a sequence are bound; a placeholder
/// reachable without one would describe an infinitely sized value.
fn bind_placeholders(nodes: &mut [Node], root: NodeId, id: &str) {
    let mut visited = HashSet::new();
    let mut stack = vec![(root, false)];
    let mut bound = HashSet::new();

    while let Some((at, in_sequence)) = stack.pop() {
        let through_sequence = in_sequence || matches!(nodes[at], Node::Sequence { .. });
        nodes[at].for_each_child(|child| match &nodes[child] {
            Node::Recursive {
                id: wanted,
                target: None,
            } if wanted == id => {
                if through_sequence {
                    bound.insert(child);
                } else {
                    log::warn!(
                        "[typecode] placeholder '{}' is not nested in a sequence, left unresolved",
                        id
                    );
                }
            }
            Node::Recursive { .. } => {}
            _ => {
                if visited.insert((child, through_sequence)) {
                    stack.push((child, through_sequence));
                }
            }
        });
    }

    for placeholder in bound {
        if let Node::Recursive { target, .. } = &mut nodes[placeholder] {
            *target = Some(root);
            log::debug!("[typecode] bound recursive placeholder '{}'", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::Value;

    fn long() -> TypeCode {
        TypeCode::primitive(TCKind::Long).unwrap()
    }

    #[test]
    fn test_primitive_is_shared() {
        let a = TypeCode::primitive(TCKind::Double).unwrap();
        let b = TypeCode::primitive(TCKind::Double).unwrap();
        assert!(Arc::ptr_eq(a.graph(), b.graph()));
    }

    #[test]
    fn test_primitive_rejects_parameterized_kinds() {
        assert_eq!(
            TypeCode::primitive(TCKind::Struct).unwrap_err(),
            Error::wrong_kind("primitive", TCKind::Struct)
        );
        assert!(TypeCode::primitive(TCKind::Recursive).is_err());
    }

    #[test]
    fn test_canonical_object_ref() {
        let tc = TypeCode::primitive(TCKind::ObjRef).unwrap();
        assert_eq!(tc.id().unwrap(), OBJECT_REPOSITORY_ID);
        assert_eq!(tc.name().unwrap(), "Object");
        assert_eq!(TypeCode::primitive(TCKind::String).unwrap().length().unwrap(), 0);
    }

    #[test]
    fn test_union_default_index() {
        let tc = TypeCode::union_tc(
            "IDL:U:1.0",
            "U",
            long(),
            vec![
                UnionMember::new("a", Value::Long(1), long()),
                UnionMember::default_branch("b", TypeCode::string(0)),
            ],
        )
        .unwrap();
        assert_eq!(tc.default_index().unwrap(), 1);
        assert!(tc.member_label(1).unwrap().is_default());
        assert_eq!(tc.member_label(0).unwrap(), UnionLabel::Value(Value::Long(1)));
    }

    #[test]
    fn test_union_rejects_bad_discriminator() {
        let err = TypeCode::union_tc(
            "IDL:U:1.0",
            "U",
            TypeCode::primitive(TCKind::Float).unwrap(),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, Error::wrong_kind("union_tc", TCKind::Float));
    }

    #[test]
    fn test_union_rejects_mismatched_label() {
        let err = TypeCode::union_tc(
            "IDL:U:1.0",
            "U",
            long(),
            vec![UnionMember::new("a", Value::Short(1), long())],
        )
        .unwrap_err();
        assert!(matches!(err, Error::WrongValueKind { .. }));
    }

    #[test]
    fn test_union_alias_discriminator() {
        let disc = TypeCode::alias("IDL:Tag:1.0", "Tag", long());
        let tc = TypeCode::union_tc(
            "IDL:U:1.0",
            "U",
            disc,
            vec![UnionMember::new("a", Value::Long(7), long())],
        )
        .unwrap();
        assert_eq!(tc.default_index().unwrap(), -1);
    }

    fn children_element(node: &TypeCode, member: usize) -> TypeCode {
        node.member_type(member)
            .and_then(|seq| seq.content_type())
            .unwrap()
    }

    #[test]
    fn test_placeholder_binds_through_sequence() {
        let placeholder = TypeCode::recursive("IDL:Node:1.0");
        let node = TypeCode::struct_tc(
            "IDL:Node:1.0",
            "Node",
            vec![
                StructMember::new("value", long()),
                StructMember::new("children", TypeCode::sequence(0, placeholder.clone())),
            ],
        );
        let element = children_element(&node, 1);
        assert_eq!(element.kind(), TCKind::Struct);
        assert_eq!(element.member_count().unwrap(), 2);
        assert_eq!(element.name().unwrap(), node.name().unwrap());
        // The caller's handle is not rewritten.
        assert_eq!(placeholder.kind(), TCKind::Recursive);
    }

    #[test]
    fn test_placeholder_without_sequence_stays_unresolved() {
        let bad = TypeCode::struct_tc(
            "IDL:Bad:1.0",
            "Bad",
            vec![StructMember::new("me", TypeCode::recursive("IDL:Bad:1.0"))],
        );
        let me = bad.member_type(0).unwrap();
        assert_eq!(me.kind(), TCKind::Recursive);
        assert!(matches!(me.member_count(), Err(Error::NotYetResolved { .. })));
    }

    #[test]
    fn test_placeholder_other_id_untouched() {
        let node = TypeCode::struct_tc(
            "IDL:Node:1.0",
            "Node",
            vec![StructMember::new(
                "others",
                TypeCode::sequence(0, TypeCode::recursive("IDL:Other:1.0")),
            )],
        );
        assert_eq!(children_element(&node, 0).kind(), TCKind::Recursive);
    }

    #[test]
    fn test_mutual_recursion() {
        // struct A { sequence<B> bs; }; struct B { sequence<A> as; };
        let b = TypeCode::struct_tc(
            "IDL:B:1.0",
            "B",
            vec![StructMember::new(
                "as",
                TypeCode::sequence(0, TypeCode::recursive("IDL:A:1.0")),
            )],
        );
        assert_eq!(children_element(&b, 0).kind(), TCKind::Recursive);

        let a = TypeCode::struct_tc(
            "IDL:A:1.0",
            "A",
            vec![StructMember::new("bs", TypeCode::sequence(0, b.clone()))],
        );
        let back = children_element(&children_element(&a, 0), 0);
        assert_eq!(back.kind(), TCKind::Struct);
        assert_eq!(back.id().unwrap(), a.id().unwrap());
        // `b` keeps its own unbound copy.
        assert_eq!(children_element(&b, 0).kind(), TCKind::Recursive);
    }

    #[test]
    fn test_member_handle_outlives_aggregate() {
        let member = {
            let node = TypeCode::struct_tc(
                "IDL:Node:1.0",
                "Node",
                vec![
                    StructMember::new("value", long()),
                    StructMember::new(
                        "children",
                        TypeCode::sequence(0, TypeCode::recursive("IDL:Node:1.0")),
                    ),
                ],
            );
            node.member_type(1).unwrap()
        };

        let element = member.content_type().unwrap();
        assert!(element.is_recursive());
        assert_eq!(element.kind(), TCKind::Struct);
        assert_eq!(element.member_count().unwrap(), 2);
        assert_eq!(children_element(&element, 1).name().unwrap(), "Node");

        let leaf = Value::Struct(vec![Value::Long(2), Value::Sequence(vec![])]);
        let tree = Value::Sequence(vec![Value::Struct(vec![
            Value::Long(1),
            Value::Sequence(vec![leaf]),
        ])]);
        let mut any = crate::any::Any::new();
        any.insert(member, tree).unwrap();
    }

    #[test]
    fn test_shared_subtree_copied_once() {
        let point = TypeCode::struct_tc(
            "IDL:Point:1.0",
            "Point",
            vec![StructMember::new("x", long())],
        );
        let line = TypeCode::struct_tc(
            "IDL:Line:1.0",
            "Line",
            vec![
                StructMember::new("from", point.clone()),
                StructMember::new("to", point),
            ],
        );
        let from = line.member_type(0).unwrap();
        let to = line.member_type(1).unwrap();
        assert!(std::ptr::eq(from.as_ptr(), to.as_ptr()));
        // long, Point, Line
        assert_eq!(line.graph().len(), 3);
    }
}
