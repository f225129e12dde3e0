//! A compile-time table mapping non-base-module package prefixes (internal,
//! slash form) to the platform module that owns them. The base module itself
//! is deliberately absent: anything not matched here is assumed to live in
//! `java.base`, which is always present and never worth recording.

use slimjre_modules::ModuleName;

/// Ordered `(package_prefix, module)` pairs. More specific prefixes are
/// listed before the broader prefixes they nest under, since lookup picks
/// the first match.
const PACKAGE_MODULE_TABLE: &[(&str, &str)] = &[
    ("javax/xml/crypto", "java.xml.crypto"),
    ("javax/xml", "java.xml"),
    ("org/w3c/dom", "java.xml"),
    ("org/xml/sax", "java.xml"),
    ("javax/sql/rowset", "java.sql.rowset"),
    ("javax/sql", "java.sql"),
    ("java/sql", "java.sql"),
    ("java/util/logging", "java.logging"),
    ("java/lang/management", "java.management"),
    ("javax/management/remote/rmi", "java.management.rmi"),
    ("javax/management", "java.management"),
    ("javax/naming", "java.naming"),
    ("java/awt/datatransfer", "java.datatransfer"),
    ("java/awt", "java.desktop"),
    ("javax/swing", "java.desktop"),
    ("javax/accessibility", "java.desktop"),
    ("javax/imageio", "java.desktop"),
    ("javax/print", "java.desktop"),
    ("javax/sound", "java.desktop"),
    ("java/applet", "java.desktop"),
    ("java/util/prefs", "java.prefs"),
    ("java/rmi", "java.rmi"),
    ("javax/script", "java.scripting"),
    ("org/ietf/jgss", "java.security.jgss"),
    ("javax/security/sasl", "java.security.sasl"),
    ("javax/smartcardio", "java.smartcardio"),
    ("java/lang/instrument", "java.instrument"),
    ("javax/annotation/processing", "java.compiler"),
    ("javax/lang/model", "java.compiler"),
    ("javax/tools", "java.compiler"),
    ("javax/transaction/xa", "java.transaction.xa"),
    ("java/net/http", "java.net.http"),
    ("com/sun/net/httpserver", "jdk.httpserver"),
    ("com/sun/management", "jdk.management"),
    ("com/sun/jdi", "jdk.jdi"),
    ("jdk/jfr", "jdk.jfr"),
    ("jdk/net", "jdk.net"),
    ("sun/misc", "jdk.unsupported"),
    ("sun/reflect", "jdk.unsupported"),
    ("javafx/beans", "javafx.base"),
    ("javafx/collections", "javafx.base"),
    ("javafx/event", "javafx.base"),
    ("javafx/util", "javafx.base"),
    ("javafx/application", "javafx.graphics"),
    ("javafx/geometry", "javafx.graphics"),
    ("javafx/stage", "javafx.graphics"),
    ("javafx/scene/control", "javafx.controls"),
    ("javafx/scene/chart", "javafx.controls"),
    ("javafx/scene/media", "javafx.media"),
    ("javafx/scene/web", "javafx.web"),
    ("javafx/embed/swing", "javafx.swing"),
    ("javafx/fxml", "javafx.fxml"),
    ("javafx/scene", "javafx.graphics"),
];

/// Lookup a package or class internal name (slash-separated) against the
/// table; the first matching prefix wins.
pub fn lookup(reference: &str) -> Option<ModuleName> {
    PACKAGE_MODULE_TABLE
        .iter()
        .find(|(prefix, _)| reference == *prefix || reference.starts_with(&format!("{prefix}/")))
        .map(|(_, module)| ModuleName::new(*module))
}

#[derive(Debug, Default)]
pub struct PackageModuleMap;

impl PackageModuleMap {
    /// Resolve an internal class name (e.g. `javax/xml/parsers/SAXParserFactory`)
    /// to the platform module that owns it, if it isn't part of `java.base`.
    pub fn lookup_class(internal_class_name: &str) -> Option<ModuleName> {
        lookup(internal_class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_package() {
        assert_eq!(
            PackageModuleMap::lookup_class("javax/xml/parsers/SAXParserFactory")
                .unwrap()
                .as_str(),
            "java.xml"
        );
    }

    #[test]
    fn prefers_more_specific_prefix() {
        assert_eq!(
            PackageModuleMap::lookup_class("javax/xml/crypto/dsig/XMLSignature")
                .unwrap()
                .as_str(),
            "java.xml.crypto"
        );
    }

    #[test]
    fn base_module_references_have_no_entry() {
        assert!(PackageModuleMap::lookup_class("java/lang/String").is_none());
        assert!(PackageModuleMap::lookup_class("java/util/List").is_none());
    }

    #[test]
    fn unrelated_application_package_has_no_entry() {
        assert!(PackageModuleMap::lookup_class("com/example/app/Main").is_none());
    }
}
