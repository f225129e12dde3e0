//! A visitor over an already-parsed [`ClassFile`], used by every
//! bytecode-level scanner (API usage, reflection, crypto, locale, zip-fs,
//! JMX) to walk the same structure without duplicating traversal logic.
//!
//! Every method has a no-op default; a scanner overrides only the hooks it
//! cares about. This mirrors the shape of a standard visitor over a parsed
//! tree rather than baking traversal into each scanner's own recursion.

use crate::classfile::ClassFile;
use crate::code::Instruction;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, ReturnType};

pub trait ClassVisitor {
    fn visit_superclass(&mut self, _superclass: &str) {}
    fn visit_interface(&mut self, _interface: &str) {}

    /// A field or method parameter/return/local field type, as it appears
    /// anywhere in a descriptor (arrays are unwrapped to their component).
    fn visit_field_type(&mut self, _field_type: &FieldType) {}

    /// A checked exception type declared on a method's `Exceptions` attribute.
    fn visit_declared_exception(&mut self, _exception_class: &str) {}

    /// The catch type of a try-catch handler (`None` for `finally`).
    fn visit_catch_type(&mut self, _catch_class: &str) {}

    /// A method invocation's target type and member.
    fn visit_method_invocation(&mut self, _owner: &str, _name: &str, _descriptor: &str) {}

    /// A field access's owner type and member.
    fn visit_field_access(&mut self, _owner: &str, _name: &str, _descriptor: &str) {}

    /// A `new`/`anewarray`/`multianewarray`/`checkcast`/`instanceof` operand.
    fn visit_type_instruction(&mut self, _class: &str) {}

    /// A `ldc` of a `String` constant.
    fn visit_loaded_string(&mut self, _value: &str) {}
}

impl ClassFile {
    /// Walk this class file, invoking every applicable [`ClassVisitor`] hook.
    ///
    /// Malformed descriptors are skipped rather than aborting the whole
    /// walk: a class file that parsed successfully but carries one
    /// unparseable descriptor should still yield every other signal to the
    /// scanners built on this.
    pub fn accept(&self, visitor: &mut impl ClassVisitor) {
        if let Some(superclass) = &self.super_class {
            visitor.visit_superclass(superclass);
        }
        for interface in &self.interfaces {
            visitor.visit_interface(interface);
        }

        for field in &self.fields {
            if let Ok(field_type) = parse_field_descriptor(&field.descriptor) {
                visit_field_type_recursive(visitor, &field_type);
            }
        }

        for method in &self.methods {
            if let Ok(descriptor) = parse_method_descriptor(&method.descriptor) {
                for param in &descriptor.params {
                    visit_field_type_recursive(visitor, param);
                }
                if let ReturnType::Type(ty) = &descriptor.return_type {
                    visit_field_type_recursive(visitor, ty);
                }
            }

            for exception in &method.exceptions {
                visitor.visit_declared_exception(exception);
            }

            let Some(code) = &method.code else {
                continue;
            };

            for handler in &code.exception_table {
                if let Some(catch_type) = &handler.catch_type {
                    visitor.visit_catch_type(catch_type);
                }
            }

            for instruction in &code.instructions {
                visit_instruction(visitor, instruction);
            }
        }
    }
}

fn visit_field_type_recursive(visitor: &mut impl ClassVisitor, field_type: &FieldType) {
    visitor.visit_field_type(field_type);
    if let FieldType::Array(component) = field_type {
        visit_field_type_recursive(visitor, component);
    }
}

fn visit_instruction(visitor: &mut impl ClassVisitor, instruction: &Instruction) {
    match instruction {
        Instruction::New { class }
        | Instruction::ANewArray { class }
        | Instruction::CheckCast { class }
        | Instruction::InstanceOf { class }
        | Instruction::MultiANewArray { class, .. } => {
            visitor.visit_type_instruction(class);
        }
        Instruction::GetStatic { owner, name, descriptor }
        | Instruction::PutStatic { owner, name, descriptor }
        | Instruction::GetField { owner, name, descriptor }
        | Instruction::PutField { owner, name, descriptor } => {
            visitor.visit_field_access(owner, name, descriptor);
        }
        Instruction::InvokeVirtual { owner, name, descriptor }
        | Instruction::InvokeSpecial { owner, name, descriptor }
        | Instruction::InvokeStatic { owner, name, descriptor }
        | Instruction::InvokeInterface { owner, name, descriptor } => {
            visitor.visit_method_invocation(owner, name, descriptor);
        }
        Instruction::InvokeDynamic { .. } => {}
        Instruction::LoadString { value } => visitor.visit_loaded_string(value),
        Instruction::Other(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::ClassMember;

    #[derive(Default)]
    struct Recorder {
        types: Vec<String>,
        strings: Vec<String>,
        invocations: Vec<(String, String)>,
    }

    impl ClassVisitor for Recorder {
        fn visit_type_instruction(&mut self, class: &str) {
            self.types.push(class.to_string());
        }
        fn visit_loaded_string(&mut self, value: &str) {
            self.strings.push(value.to_string());
        }
        fn visit_method_invocation(&mut self, owner: &str, name: &str, _descriptor: &str) {
            self.invocations.push((owner.to_string(), name.to_string()));
        }
    }

    fn empty_member() -> ClassMember {
        ClassMember {
            access_flags: 0,
            name: String::new(),
            descriptor: "()V".to_string(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            constant_value: None,
            exceptions: Vec::new(),
            code: None,
        }
    }

    #[test]
    fn walks_type_instructions_and_loaded_strings() {
        use crate::code::{CodeAttribute, Instruction};

        let mut method = empty_member();
        method.code = Some(CodeAttribute {
            max_stack: 2,
            max_locals: 1,
            instructions: vec![
                Instruction::New {
                    class: "java/lang/Class".to_string(),
                },
                Instruction::LoadString {
                    value: "java.lang.reflect.Method".to_string(),
                },
                Instruction::InvokeStatic {
                    owner: "java/lang/Class".to_string(),
                    name: "forName".to_string(),
                    descriptor: "(Ljava/lang/String;)Ljava/lang/Class;".to_string(),
                },
            ],
            exception_table: Vec::new(),
        });

        let class = ClassFile {
            minor_version: 0,
            major_version: 61,
            access_flags: 0,
            this_class: "com/example/Demo".to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: vec![method],
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        };

        let mut recorder = Recorder::default();
        class.accept(&mut recorder);

        assert_eq!(recorder.types, vec!["java/lang/Class".to_string()]);
        assert_eq!(
            recorder.strings,
            vec!["java.lang.reflect.Method".to_string()]
        );
        assert_eq!(
            recorder.invocations,
            vec![("java/lang/Class".to_string(), "forName".to_string())]
        );
    }
}
