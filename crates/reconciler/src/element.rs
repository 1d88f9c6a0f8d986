//! Immutable element descriptions.
//!
//! Invariants:
//! - `children` is always present, possibly empty.
//! - Scalar children are normalized into `Text` elements carrying a single
//!   [`TEXT_VALUE`] property, so every node in an element tree is uniform.
//! - Elements are cheap to clone; clones share the same description.

use crate::hooks::Hooks;
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Property carrying the content of a text element.
pub const TEXT_VALUE: &str = "nodeValue";

/// Payload delivered to an [`EventHandler`] by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub name: Arc<str>,
    pub value: Option<PropValue>,
}

impl Event {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Shared event callback. Two handlers are equal only if they are the same
/// allocation, so re-creating a closure on every render counts as a change.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Str(Arc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Int(n) => write!(f, "{n}"),
            PropValue::Float(n) => write!(f, "{n}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Handler(_) => f.write_str("<handler>"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Arc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Arc::from(value))
    }
}

impl From<Arc<str>> for PropValue {
    fn from(value: Arc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

/// Immutable property map. Iteration is ordered by name.
#[derive(Clone, Default, PartialEq)]
pub struct Props(Rc<BTreeMap<Arc<str>, PropValue>>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with `name` set; the original is left untouched.
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.0).insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for Props
where
    K: Into<Arc<str>>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props(Rc::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

type RenderFn = dyn Fn(&mut Hooks<'_>, &Props) -> Element;

/// A function component.
///
/// Identity is the Rust type of the render function, so the same function
/// item compares equal across renders while two different functions never do.
#[derive(Clone)]
pub struct Component {
    id: TypeId,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut Hooks<'_>, &Props) -> Element + 'static,
    {
        let full = std::any::type_name::<F>();
        let name = full.rsplit("::").next().unwrap_or(full);
        Self {
            id: TypeId::of::<F>(),
            name,
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, hooks: &mut Hooks<'_>, props: &Props) -> Element {
        (self.render)(hooks, props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    Host(Arc<str>),
    Text,
    Component(Component),
}

#[derive(Clone, Debug)]
struct ElementData {
    ty: ElementType,
    props: Props,
    children: Vec<Element>,
}

#[derive(Clone, Debug)]
pub struct Element(Rc<ElementData>);

impl Element {
    fn from_parts(ty: ElementType, props: Props, children: Vec<Element>) -> Self {
        Element(Rc::new(ElementData {
            ty,
            props,
            children,
        }))
    }

    pub fn host(tag: impl Into<Arc<str>>) -> Self {
        Self::from_parts(ElementType::Host(tag.into()), Props::new(), Vec::new())
    }

    pub fn text(value: impl Into<PropValue>) -> Self {
        Self::from_parts(
            ElementType::Text,
            Props::new().with(TEXT_VALUE, value),
            Vec::new(),
        )
    }

    pub fn component<F>(render: F) -> Self
    where
        F: Fn(&mut Hooks<'_>, &Props) -> Element + 'static,
    {
        Self::from_parts(
            ElementType::Component(Component::new(render)),
            Props::new(),
            Vec::new(),
        )
    }

    pub fn prop(mut self, name: impl Into<Arc<str>>, value: impl Into<PropValue>) -> Self {
        let data = Rc::make_mut(&mut self.0);
        data.props = std::mem::take(&mut data.props).with(name, value);
        self
    }

    /// Subscribes `handler` to `event` (`"click"` is stored as `onClick`).
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        let mut name = String::with_capacity(event.len() + 2);
        name.push_str("on");
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
        self.prop(name, EventHandler::new(handler))
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        Rc::make_mut(&mut self.0)
            .children
            .push(child.into().into_element());
        self
    }

    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        Rc::make_mut(&mut self.0)
            .children
            .extend(children.into_iter().map(|c| c.into().into_element()));
        self
    }

    pub fn ty(&self) -> &ElementType {
        &self.0.ty
    }

    pub fn props(&self) -> &Props {
        &self.0.props
    }

    pub fn element_children(&self) -> &[Element] {
        &self.0.children
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.ty, ElementType::Text)
    }
}

/// A child as supplied by the caller: either an element or a scalar that
/// becomes a text element.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Text(PropValue),
}

impl Child {
    pub fn into_element(self) -> Element {
        match self {
            Child::Element(element) => element,
            Child::Text(value) => Element::text(value),
        }
    }
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

macro_rules! scalar_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(PropValue::from(value))
                }
            }
        )*
    };
}

scalar_child!(&str, String, Arc<str>, i64, i32, u32, f64, bool);

pub fn create_element(ty: ElementType, props: Props, children: Vec<Child>) -> Element {
    Element::from_parts(
        ty,
        props,
        children.into_iter().map(Child::into_element).collect(),
    )
}
