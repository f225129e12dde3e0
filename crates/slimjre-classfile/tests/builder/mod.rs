//! A minimal class file byte assembler, used only by this crate's
//! integration tests to construct valid `.class` inputs without checking in
//! compiled binaries.

use slimjre_classfile::{ConstValue, ElementValue};

struct ConstantPoolBuilder {
    entries: Vec<Vec<u8>>,
}

impl ConstantPoolBuilder {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn push(&mut self, bytes: Vec<u8>) -> u16 {
        self.entries.push(bytes);
        self.entries.len() as u16
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut bytes = vec![1u8];
        bytes.extend((value.len() as u16).to_be_bytes());
        bytes.extend(value.as_bytes());
        self.push(bytes)
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        let mut bytes = vec![7u8];
        bytes.extend(name_index.to_be_bytes());
        self.push(bytes)
    }

    fn integer(&mut self, value: i32) -> u16 {
        let mut bytes = vec![3u8];
        bytes.extend(value.to_be_bytes());
        self.push(bytes)
    }

    fn string(&mut self, value: &str) -> u16 {
        let utf8_index = self.utf8(value);
        let mut bytes = vec![8u8];
        bytes.extend(utf8_index.to_be_bytes());
        self.push(bytes)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let count = (self.entries.len() + 1) as u16;
        out.extend(count.to_be_bytes());
        for entry in &self.entries {
            out.extend(entry);
        }
        out
    }
}

fn attribute(name_index: u16, info: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(name_index.to_be_bytes());
    out.extend((info.len() as u32).to_be_bytes());
    out.extend(info);
    out
}

struct Member {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<Vec<u8>>,
}

impl Member {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.access_flags.to_be_bytes());
        out.extend(self.name_index.to_be_bytes());
        out.extend(self.descriptor_index.to_be_bytes());
        out.extend((self.attributes.len() as u16).to_be_bytes());
        for attr in &self.attributes {
            out.extend(attr);
        }
        out
    }
}

pub struct ClassFileBuilder {
    cp: ConstantPoolBuilder,
    this_class: u16,
    super_class: u16,
    fields: Vec<Member>,
    methods: Vec<Member>,
    class_attributes: Vec<Vec<u8>>,
    signature_name: Option<u16>,
}

impl ClassFileBuilder {
    pub fn new(this_class: &str, super_class: Option<&str>) -> Self {
        let mut cp = ConstantPoolBuilder::new();
        let this_class = cp.class(this_class);
        let super_class = super_class.map(|s| cp.class(s)).unwrap_or(0);
        Self {
            cp,
            this_class,
            super_class,
            fields: Vec::new(),
            methods: Vec::new(),
            class_attributes: Vec::new(),
            signature_name: None,
        }
    }

    fn signature_attribute_name(&mut self) -> u16 {
        match self.signature_name {
            Some(idx) => idx,
            None => {
                let idx = self.cp.utf8("Signature");
                self.signature_name = Some(idx);
                idx
            }
        }
    }

    pub fn field(&mut self, access_flags: u16, name: &str, descriptor: &str) {
        let name_index = self.cp.utf8(name);
        let descriptor_index = self.cp.utf8(descriptor);
        self.fields.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
    }

    pub fn field_with_signature(&mut self, access_flags: u16, name: &str, descriptor: &str, signature: &str) {
        let name_index = self.cp.utf8(name);
        let descriptor_index = self.cp.utf8(descriptor);
        let sig_index = self.cp.utf8(signature);
        let sig_name = self.signature_attribute_name();
        let mut info = Vec::new();
        info.extend(sig_index.to_be_bytes());
        self.fields.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: vec![attribute(sig_name, info)],
        });
    }

    pub fn method(&mut self, access_flags: u16, name: &str, descriptor: &str) {
        let name_index = self.cp.utf8(name);
        let descriptor_index = self.cp.utf8(descriptor);
        self.methods.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
    }

    pub fn method_with_signature(&mut self, access_flags: u16, name: &str, descriptor: &str, signature: &str) {
        let name_index = self.cp.utf8(name);
        let descriptor_index = self.cp.utf8(descriptor);
        let sig_index = self.cp.utf8(signature);
        let sig_name = self.signature_attribute_name();
        let mut info = Vec::new();
        info.extend(sig_index.to_be_bytes());
        self.methods.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: vec![attribute(sig_name, info)],
        });
    }

    pub fn class_signature(&mut self, signature: &str) {
        let sig_index = self.cp.utf8(signature);
        let sig_name = self.signature_attribute_name();
        let mut info = Vec::new();
        info.extend(sig_index.to_be_bytes());
        self.class_attributes.push(attribute(sig_name, info));
    }

    fn annotations_attribute(&mut self, attr_name: &str, type_descriptor: &str, elements: Vec<(&str, ElementValue)>) {
        let name_index = self.cp.utf8(attr_name);
        let mut info = Vec::new();
        info.extend(1u16.to_be_bytes()); // num_annotations
        info.extend(self.encode_annotation(type_descriptor, elements));
        self.class_attributes.push(attribute(name_index, info));
    }

    pub fn visible_annotation(&mut self, type_descriptor: &str, elements: Vec<(&str, ElementValue)>) {
        self.annotations_attribute("RuntimeVisibleAnnotations", type_descriptor, elements);
    }

    pub fn invisible_annotation(&mut self, type_descriptor: &str, elements: Vec<(&str, ElementValue)>) {
        self.annotations_attribute("RuntimeInvisibleAnnotations", type_descriptor, elements);
    }

    fn encode_annotation(&mut self, type_descriptor: &str, elements: Vec<(&str, ElementValue)>) -> Vec<u8> {
        let mut out = Vec::new();
        let type_index = self.cp.utf8(type_descriptor);
        out.extend(type_index.to_be_bytes());
        out.extend((elements.len() as u16).to_be_bytes());
        for (name, value) in elements {
            let name_index = self.cp.utf8(name);
            out.extend(name_index.to_be_bytes());
            out.extend(self.encode_element_value(&value));
        }
        out
    }

    fn encode_element_value(&mut self, value: &ElementValue) -> Vec<u8> {
        let mut out = Vec::new();
        match value {
            ElementValue::Const(ConstValue::Int(v)) => {
                out.push(b'I');
                let idx = self.cp.integer(*v);
                out.extend(idx.to_be_bytes());
            }
            ElementValue::Const(ConstValue::String(s)) => {
                out.push(b's');
                let idx = self.cp.string(s);
                out.extend(idx.to_be_bytes());
            }
            ElementValue::Array(values) => {
                out.push(b'[');
                out.extend((values.len() as u16).to_be_bytes());
                for v in values {
                    out.extend(self.encode_element_value(v));
                }
            }
            other => panic!("test builder does not support element value {other:?}"),
        }
        out
    }

    pub fn inner_class(&mut self, inner: &str, outer: Option<&str>, name: Option<&str>, access_flags: u16) {
        let attr_name = self.cp.utf8("InnerClasses");
        let inner_index = self.cp.class(inner);
        let outer_index = outer.map(|o| self.cp.class(o)).unwrap_or(0);
        let name_index = name.map(|n| self.cp.utf8(n)).unwrap_or(0);

        let mut info = Vec::new();
        info.extend(1u16.to_be_bytes()); // number_of_classes
        info.extend(inner_index.to_be_bytes());
        info.extend(outer_index.to_be_bytes());
        info.extend(name_index.to_be_bytes());
        info.extend(access_flags.to_be_bytes());
        self.class_attributes.push(attribute(attr_name, info));
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(0xCAFEBABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes()); // minor_version
        out.extend(61u16.to_be_bytes()); // major_version: Java 17
        out.extend(self.cp.to_bytes());
        out.extend(0x0021u16.to_be_bytes()); // ACC_PUBLIC | ACC_SUPER
        out.extend(self.this_class.to_be_bytes());
        out.extend(self.super_class.to_be_bytes());
        out.extend(0u16.to_be_bytes()); // interfaces_count

        out.extend((self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            out.extend(field.to_bytes());
        }

        out.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            out.extend(method.to_bytes());
        }

        out.extend((self.class_attributes.len() as u16).to_be_bytes());
        for attr in &self.class_attributes {
            out.extend(attr);
        }

        out
    }
}
