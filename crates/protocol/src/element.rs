use serde::{Deserialize, Serialize};

use crate::types::Point;

/// The animatable sub-elements of one content slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementRole {
    BreadcrumbAbove,
    BackLink,
    Heading,
    Description,
    PublicationDate,
    Buttons,
    Navigation,
    BreadcrumbBelow,
}

impl ElementRole {
    /// Every role, in reveal order.
    pub const ALL: [ElementRole; 8] = [
        ElementRole::BreadcrumbAbove,
        ElementRole::BackLink,
        ElementRole::Heading,
        ElementRole::Description,
        ElementRole::PublicationDate,
        ElementRole::Buttons,
        ElementRole::Navigation,
        ElementRole::BreadcrumbBelow,
    ];

    /// Class-name suffix used by the markup for this role.
    pub fn slug(self) -> &'static str {
        match self {
            ElementRole::BreadcrumbAbove => "breadcrumb-above",
            ElementRole::BackLink => "back-link",
            ElementRole::Heading => "title",
            ElementRole::Description => "description",
            ElementRole::PublicationDate => "date",
            ElementRole::Buttons => "buttons",
            ElementRole::Navigation => "navigation",
            ElementRole::BreadcrumbBelow => "breadcrumb-below",
        }
    }
}

/// Opacity plus translate offset of one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub opacity: f64,
    pub offset: Point,
}

impl ElementStyle {
    /// Final resting state: fully opaque, no offset.
    pub const SHOWN: Self = Self {
        opacity: 1.0,
        offset: Point::ZERO,
    };

    pub fn hidden_at(offset: Point) -> Self {
        Self {
            opacity: 0.0,
            offset,
        }
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            opacity: self.opacity + (other.opacity - self.opacity) * t,
            offset: self.offset.lerp(other.offset, t),
        }
    }

    pub fn is_shown(&self) -> bool {
        self.opacity >= 1.0 && self.offset == Point::ZERO
    }
}
