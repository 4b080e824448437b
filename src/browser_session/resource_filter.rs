//! Request filtering by resource class
//!
//! Rendering-irrelevant resources are aborted before they hit the network.
//! The decision is a pure function of the resource class so it can be
//! handed to every tab without shared state.

use chromiumoxide::cdp::browser_protocol::network::ResourceType;

/// Coarse resource classes the filter decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Document,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
    /// XHR and fetch() traffic
    Fetch,
    WebSocket,
    Other,
}

impl From<&ResourceType> for ResourceClass {
    fn from(resource_type: &ResourceType) -> Self {
        match resource_type {
            ResourceType::Document => Self::Document,
            ResourceType::Script => Self::Script,
            ResourceType::Stylesheet => Self::Stylesheet,
            ResourceType::Image => Self::Image,
            ResourceType::Font => Self::Font,
            ResourceType::Media => Self::Media,
            ResourceType::Xhr | ResourceType::Fetch | ResourceType::EventSource => Self::Fetch,
            ResourceType::WebSocket => Self::WebSocket,
            _ => Self::Other,
        }
    }
}

/// Decides whether a paused request may continue
pub type ResourcePredicate = fn(ResourceClass) -> bool;

/// Abort images, fonts and stylesheets; allow everything else
#[must_use]
pub fn should_allow(class: ResourceClass) -> bool {
    !matches!(
        class,
        ResourceClass::Image | ResourceClass::Font | ResourceClass::Stylesheet
    )
}

/// Let every request through
#[must_use]
pub fn allow_all(_class: ResourceClass) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heavy_resources_are_aborted() {
        for class in [ResourceClass::Image, ResourceClass::Font, ResourceClass::Stylesheet] {
            assert!(!should_allow(class), "{class:?}");
        }
    }

    #[test]
    fn test_content_resources_pass() {
        for class in [
            ResourceClass::Document,
            ResourceClass::Script,
            ResourceClass::Fetch,
            ResourceClass::Media,
            ResourceClass::WebSocket,
            ResourceClass::Other,
        ] {
            assert!(should_allow(class), "{class:?}");
        }
    }

    #[test]
    fn test_cdp_mapping() {
        assert_eq!(ResourceClass::from(&ResourceType::Xhr), ResourceClass::Fetch);
        assert_eq!(ResourceClass::from(&ResourceType::Image), ResourceClass::Image);
        assert_eq!(ResourceClass::from(&ResourceType::Ping), ResourceClass::Other);
    }
}
