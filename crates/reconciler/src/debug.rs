use crate::element::{Element, ElementType, PropValue, TEXT_VALUE};
use crate::fiber::{FiberArena, FiberId, FiberTag};
use std::fmt::Write;

/// Structural outline of a fiber or element tree, for comparisons in tests
/// and debug output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiberShape {
    pub label: String,
    pub children: Vec<FiberShape>,
}

impl FiberShape {
    pub(crate) fn of_fiber<N>(arena: &FiberArena<N>, id: FiberId) -> Self {
        let fiber = &arena[id];
        let label = match &fiber.tag {
            FiberTag::Text => text_label(fiber.props.get(TEXT_VALUE)),
            tag => tag.label(),
        };
        Self {
            label,
            children: arena
                .children(id)
                .into_iter()
                .map(|child| Self::of_fiber(arena, child))
                .collect(),
        }
    }

    /// Shape an element tree reconciles to when it contains no components.
    pub fn of_element(element: &Element) -> Self {
        let label = match element.ty() {
            ElementType::Host(tag) => tag.to_string(),
            ElementType::Text => text_label(element.props().get(TEXT_VALUE)),
            ElementType::Component(c) => format!("<{}>", c.name()),
        };
        Self {
            label,
            children: element.element_children().iter().map(Self::of_element).collect(),
        }
    }

    pub fn render(&self) -> String {
        fn walk(shape: &FiberShape, depth: usize, out: &mut String) {
            if !out.is_empty() {
                out.push('\n');
            }
            for _ in 0..depth {
                out.push_str("  ");
            }
            out.push_str(&shape.label);
            for child in &shape.children {
                walk(child, depth + 1, out);
            }
        }
        let mut out = String::new();
        walk(self, 0, &mut out);
        out
    }
}

fn text_label(value: Option<&PropValue>) -> String {
    let mut out = String::from("#text");
    if let Some(value) = value {
        let _ = write!(&mut out, " {:?}", value.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_shape_renders_indented() {
        let el = Element::host("div")
            .child(Element::host("h1").child("Hello"))
            .child(Element::host("h2"));
        assert_eq!(
            FiberShape::of_element(&el).render(),
            "div\n  h1\n    #text \"Hello\"\n  h2"
        );
    }
}
