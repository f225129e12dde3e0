#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod code;
mod constant_pool;
mod descriptor;
mod error;
mod module_info;
mod reader;
mod visitor;

pub use crate::annotation::{Annotation, ConstValue, ElementValue};
pub use crate::classfile::{ClassFile, ClassMember, InnerClassInfo};
pub use crate::code::{CodeAttribute, ExceptionHandler, Instruction};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::module_info::parse_module_info_class;
pub use crate::visitor::ClassVisitor;
