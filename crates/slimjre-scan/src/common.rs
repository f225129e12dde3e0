//! Shared plumbing used by more than one scanner.

use std::path::{Path, PathBuf};

use slimjre_archive::Archive;
use slimjre_classfile::{parse_field_descriptor, parse_method_descriptor, ClassFile, FieldType, ReturnType};
use slimjre_diagnostics::{Warning, WarningSink};

/// Parse every API class entry of every archive, invoking `visit` with the
/// archive path and the parsed class. Archive-open failures, entry-read
/// failures, and malformed classes are all recorded as warnings and skipped
/// rather than aborting the scan, matching every bytecode-level scanner's
/// maximally-permissive error policy.
pub(crate) fn for_each_class(archives: &[PathBuf], warnings: &WarningSink, mut visit: impl FnMut(&Path, &ClassFile)) {
    for path in archives {
        let archive = Archive::open(path);
        let entries = match archive.api_class_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warnings.push(Warning::for_archive("corrupt-archive", path, err.to_string()));
                continue;
            }
        };

        for entry in entries {
            let bytes = match archive.read(&entry) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(err) => {
                    warnings.push(Warning::for_archive(
                        "corrupt-archive",
                        path,
                        format!("failed to read entry `{entry}`: {err}"),
                    ));
                    continue;
                }
            };

            match ClassFile::parse(&bytes) {
                Ok(class) => visit(path, &class),
                Err(err) => {
                    warnings.push(Warning::for_archive(
                        "malformed-class",
                        path,
                        format!("failed to parse `{entry}`: {err}"),
                    ));
                }
            }
        }
    }
}

/// Every internal class name referenced by a method or field descriptor
/// string, arrays unwrapped to their component. Used by scanners that look
/// at instruction-level descriptors (crypto, zip-fs, JMX) in addition to the
/// declared-member descriptors `ClassVisitor` already walks.
pub(crate) fn descriptor_object_types(descriptor: &str) -> Vec<String> {
    let mut types = Vec::new();
    if let Ok(parsed) = parse_method_descriptor(descriptor) {
        for param in &parsed.params {
            collect_object_types(param, &mut types);
        }
        if let ReturnType::Type(ty) = &parsed.return_type {
            collect_object_types(ty, &mut types);
        }
    } else if let Ok(field_type) = parse_field_descriptor(descriptor) {
        collect_object_types(&field_type, &mut types);
    }
    types
}

fn collect_object_types(field_type: &FieldType, out: &mut Vec<String>) {
    match field_type {
        FieldType::Object(name) => out.push(name.clone()),
        FieldType::Array(component) => collect_object_types(component, out),
        FieldType::Base(_) => {}
    }
}
