//! Navigation metadata model

pub mod annotations;
pub mod record;

pub use annotations::{
    AuthorizationHints, ConfigCondition, HandlerDescriptor, HttpMethod, MenuAnnotation,
    MetaAnnotation, PageAnnotation, PropertyAnnotation, RelatedAnnotation, RouteAnnotation,
};
pub use record::{
    normalize_lookup_url, normalize_url, parse_tags, AnnotationRecord, HandlerId, RelatedLink,
};
