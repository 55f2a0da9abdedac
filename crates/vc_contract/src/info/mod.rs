//! Static descriptions of value types, members and constructors.

mod attributes;
mod constructor;
mod member;
mod type_spec;

pub use attributes::{CustomAttributes, Rename};
pub use constructor::{ConstructorArgs, ConstructorInfo};
pub use member::{MemberInfo, MemberKind, Writer, writer};
pub use type_spec::{BoxedValue, FieldType, SequenceSpec, Shape, TypeSpec};

pub(crate) use attributes::impl_custom_attributes_fn;
