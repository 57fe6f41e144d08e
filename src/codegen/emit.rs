//! TypeScript printing via the [`Emit`] trait.
//!
//! Output uses four-space indentation and double-quoted strings. Imports are
//! printed as one block, exports as another, and every other declaration is
//! separated by a blank line.

use super::ast::{
    ClassDeclaration, ClassMember, ConstDeclaration, EnumDeclaration, ExportDeclaration,
    ExportSpecifier, Expr, FunctionDeclaration, ImportDeclaration, ImportSpecifier,
    InterfaceDeclaration, Keyword, Literal, Param, Property, SourceFile, Statement, Stmt,
    TsType, TypeAliasDeclaration, TypeParam,
};
use super::utils::{quote, quote_if_needed};

const INDENT: &str = "    ";

pub trait Emit {
    fn emit(&self) -> String;
}

/// Prints a whole declaration tree.
pub fn print(file: &SourceFile) -> String {
    let mut output = String::new();
    let mut previous: Option<&Statement> = None;

    for statement in &file.statements {
        if let Some(previous) = previous {
            let same_block = (previous.is_import() && statement.is_import())
                || (previous.is_export() && statement.is_export());
            if !same_block {
                output.push('\n');
            }
        }
        output.push_str(&statement.emit());
        previous = Some(statement);
    }

    output
}

fn join<T: Emit>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(Emit::emit)
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Types
// =============================================================================

impl Emit for Keyword {
    fn emit(&self) -> String {
        match self {
            Keyword::String => "string",
            Keyword::Number => "number",
            Keyword::Boolean => "boolean",
            Keyword::Unknown => "unknown",
            Keyword::Void => "void",
            Keyword::Undefined => "undefined",
        }
        .to_string()
    }
}

impl Emit for Literal {
    fn emit(&self) -> String {
        match self {
            Literal::String(s) => quote(s),
            Literal::Int(i) => i.to_string(),
            Literal::Bool(b) => b.to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Keyword(keyword) => keyword.emit(),
            TsType::Reference { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    format!("{}<{}>", name, join(args, ", "))
                }
            }
            TsType::Array(item) => format!("Array<{}>", item.emit()),
            TsType::Record(value) => format!("Record<string, {}>", value.emit()),
            TsType::Union(members) => join(members, " | "),
            TsType::Intersection(members) => members
                .iter()
                .map(|member| match member {
                    TsType::Union(_) => format!("({})", member.emit()),
                    _ => member.emit(),
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Literal(literal) => literal.emit(),
            TsType::TypeQuery(name) => format!("typeof {name}"),
            TsType::TypeLiteral(properties) => {
                if properties.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", join(properties, "; "))
                }
            }
        }
    }
}

impl Emit for TypeParam {
    fn emit(&self) -> String {
        let mut output = self.name.clone();
        if let Some(constraint) = &self.constraint {
            output.push_str(&format!(" extends {}", constraint.emit()));
        }
        if let Some(default) = &self.default {
            output.push_str(&format!(" = {}", default.emit()));
        }
        output
    }
}

fn emit_type_params(params: &[TypeParam]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", join(params, ", "))
    }
}

impl Emit for Property {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", quote_if_needed(&self.name), opt, self.ty.emit())
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for Param {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{}: {}", self.name, opt, ty.emit()),
            None => format!("{}{}", self.name, opt),
        }
    }
}

impl Emit for Expr {
    fn emit(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::This => "this".to_string(),
            Expr::Str(value) => quote(value),
            Expr::Bool(value) => value.to_string(),
            Expr::Call { callee, args } => format!("{}({})", callee.emit(), join(args, ", ")),
            Expr::New { callee, args } => format!("new {}({})", callee.emit(), join(args, ", ")),
            Expr::Member { object, prop } => format!("{}.{}", object.emit(), prop),
            Expr::Index { object, index } => format!("{}[{}]", object.emit(), index.emit()),
            Expr::Object(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| match value {
                        Expr::Ident(name) if name == key => name.clone(),
                        _ => format!("{}: {}", quote_if_needed(key), value.emit()),
                    })
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            Expr::Arrow { params, body } => {
                format!("({}) => {}", join(params, ", "), body.emit())
            }
        }
    }
}

impl Stmt {
    fn emit_indented(&self, depth: usize) -> String {
        let prefix = INDENT.repeat(depth);
        match self {
            Stmt::Return(expr) => format!("{}return {};\n", prefix, expr.emit()),
            Stmt::Expr(expr) => format!("{}{};\n", prefix, expr.emit()),
        }
    }
}

fn emit_block(body: &[Stmt], depth: usize) -> String {
    let mut output = String::from("{\n");
    for stmt in body {
        output.push_str(&stmt.emit_indented(depth + 1));
    }
    output.push_str(&INDENT.repeat(depth));
    output.push('}');
    output
}

// =============================================================================
// Declarations
// =============================================================================

impl Emit for InterfaceDeclaration {
    fn emit(&self) -> String {
        let mut output = format!("interface {}{}", self.name, emit_type_params(&self.type_params));
        if !self.extends.is_empty() {
            output.push_str(&format!(" extends {}", join(&self.extends, ", ")));
        }
        if self.properties.is_empty() {
            output.push_str(" {\n}\n");
            return output;
        }
        output.push_str(" {\n");
        for property in &self.properties {
            output.push_str(&format!("{}{};\n", INDENT, property.emit()));
        }
        output.push_str("}\n");
        output
    }
}

impl Emit for TypeAliasDeclaration {
    fn emit(&self) -> String {
        format!(
            "type {}{} = {};\n",
            self.name,
            emit_type_params(&self.type_params),
            self.ty.emit()
        )
    }
}

impl Emit for EnumDeclaration {
    fn emit(&self) -> String {
        let members: Vec<String> = self
            .members
            .iter()
            .map(|(name, value)| format!("{}{} = {}", INDENT, quote_if_needed(name), quote(value)))
            .collect();
        format!("enum {} {{\n{}\n}}\n", self.name, members.join(",\n"))
    }
}

impl Emit for FunctionDeclaration {
    fn emit(&self) -> String {
        let async_str = if self.is_async { "async " } else { "" };
        let return_type = self
            .return_type
            .as_ref()
            .map(|ty| format!(": {}", ty.emit()))
            .unwrap_or_default();
        format!(
            "{}function {}({}){} {}\n",
            async_str,
            self.name,
            join(&self.params, ", "),
            return_type,
            emit_block(&self.body, 0)
        )
    }
}

impl Emit for ClassMember {
    fn emit(&self) -> String {
        match self {
            ClassMember::StaticProperty {
                name,
                is_override,
                value,
            } => {
                let modifier = if *is_override { "static override" } else { "static" };
                format!("{}{} {} = {};\n", INDENT, modifier, name, value.emit())
            }
            ClassMember::Getter {
                name,
                return_type,
                body,
            } => format!(
                "{}get {}(): {} {}\n",
                INDENT,
                quote_if_needed(name),
                return_type.emit(),
                emit_block(body, 1)
            ),
        }
    }
}

impl Emit for ClassDeclaration {
    fn emit(&self) -> String {
        let mut output = format!("class {}{}", self.name, emit_type_params(&self.type_params));
        if let Some(parent) = &self.extends {
            output.push_str(&format!(" extends {}", parent.emit()));
        }
        output.push_str(" {\n");
        let members: Vec<String> = self.members.iter().map(Emit::emit).collect();
        output.push_str(&members.join("\n"));
        output.push_str("}\n");
        output
    }
}

impl Emit for ConstDeclaration {
    fn emit(&self) -> String {
        let ty = self
            .ty
            .as_ref()
            .map(|ty| format!(": {}", ty.emit()))
            .unwrap_or_default();
        format!("const {}{} = {};\n", self.name, ty, self.init.emit())
    }
}

// =============================================================================
// Imports and exports
// =============================================================================

impl Emit for ImportSpecifier {
    fn emit(&self) -> String {
        if self.imported == self.local {
            self.local.clone()
        } else {
            format!("{} as {}", self.imported, self.local)
        }
    }
}

impl Emit for ImportDeclaration {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        let mut clauses = Vec::new();

        if let Some(default) = &self.default {
            clauses.push(default.clone());
        }
        if let Some(namespace) = &self.namespace {
            clauses.push(format!("* as {namespace}"));
        }
        if !self.named.is_empty() {
            let specifiers: Vec<String> = self
                .named
                .iter()
                .map(|specifier| {
                    if specifier.type_only && !self.type_only {
                        format!("type {}", specifier.emit())
                    } else {
                        specifier.emit()
                    }
                })
                .collect();
            clauses.push(format!("{{ {} }}", specifiers.join(", ")));
        }

        format!(
            "import {}{} from {};\n",
            type_keyword,
            clauses.join(", "),
            quote(&self.module)
        )
    }
}

impl Emit for ExportSpecifier {
    fn emit(&self) -> String {
        if self.local == self.exported {
            self.local.clone()
        } else {
            format!("{} as {}", self.local, self.exported)
        }
    }
}

impl Emit for ExportDeclaration {
    fn emit(&self) -> String {
        match self {
            ExportDeclaration::Default(name) => format!("export default {name};\n"),
            ExportDeclaration::Named(specifiers) => {
                let all_types = specifiers.iter().all(|s| s.type_only);
                let keyword = if all_types { "export type" } else { "export" };
                let parts: Vec<String> = specifiers
                    .iter()
                    .map(|specifier| {
                        if specifier.type_only && !all_types {
                            format!("type {}", specifier.emit())
                        } else {
                            specifier.emit()
                        }
                    })
                    .collect();
                format!("{} {{ {} }};\n", keyword, parts.join(", "))
            }
        }
    }
}

impl Emit for Statement {
    fn emit(&self) -> String {
        match self {
            Statement::Import(decl) => decl.emit(),
            Statement::Interface(decl) => decl.emit(),
            Statement::TypeAlias(decl) => decl.emit(),
            Statement::Enum(decl) => decl.emit(),
            Statement::Function(decl) => decl.emit(),
            Statement::Class(decl) => decl.emit(),
            Statement::Const(decl) => decl.emit(),
            Statement::Export(decl) => decl.emit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_types() {
        let ty = TsType::Array(Box::new(TsType::keyword(Keyword::String).nullable())).nullable();
        assert_eq!(ty.emit(), "Array<string | undefined> | undefined");

        let record = TsType::Record(Box::new(TsType::reference("Foo_1")));
        assert_eq!(record.emit(), "Record<string, Foo_1>");

        let generic = TsType::generic("Promise", vec![TsType::keyword(Keyword::Void)]);
        assert_eq!(generic.emit(), "Promise<void>");

        let intersection = TsType::Intersection(vec![
            TsType::reference("A"),
            TsType::union([TsType::reference("B"), TsType::reference("C")]),
        ]);
        assert_eq!(intersection.emit(), "A & (B | C)");
    }

    #[test]
    fn test_emit_interface() {
        let decl = InterfaceDeclaration {
            name: "Pair".into(),
            type_params: vec![TypeParam::named("K"), TypeParam::named("V")],
            extends: vec![TsType::reference("Base_1")],
            properties: vec![
                Property {
                    name: "key".into(),
                    ty: TsType::reference("K"),
                    optional: false,
                },
                Property {
                    name: "@type".into(),
                    ty: TsType::string_literal("pair"),
                    optional: false,
                },
            ],
        };
        assert_eq!(
            decl.emit(),
            "interface Pair<K, V> extends Base_1 {\n    key: K;\n    \"@type\": \"pair\";\n}\n"
        );
    }

    #[test]
    fn test_emit_function() {
        let decl = FunctionDeclaration {
            name: "bar".into(),
            is_async: true,
            params: vec![
                Param::new("name", TsType::keyword(Keyword::String)),
                Param {
                    name: "init".into(),
                    ty: Some(TsType::reference("EndpointRequestInit_1")),
                    optional: true,
                },
            ],
            return_type: Some(TsType::generic(
                "Promise",
                vec![TsType::keyword(Keyword::String)],
            )),
            body: vec![Stmt::Return(Expr::call(
                Expr::member(Expr::ident("client_1"), "call"),
                vec![
                    Expr::Str("Foo".into()),
                    Expr::Str("bar".into()),
                    Expr::Object(vec![("name".into(), Expr::ident("name"))]),
                    Expr::ident("init"),
                ],
            ))],
        };
        assert_eq!(
            decl.emit(),
            "async function bar(name: string, init?: EndpointRequestInit_1): Promise<string> {\n    return client_1.call(\"Foo\", \"bar\", { name }, init);\n}\n"
        );
    }

    #[test]
    fn test_emit_imports_and_exports() {
        let import = ImportDeclaration {
            module: "@vaadin/hilla-frontend".into(),
            type_only: false,
            default: None,
            named: vec![
                ImportSpecifier {
                    imported: "EndpointRequestInit".into(),
                    local: "EndpointRequestInit_1".into(),
                    type_only: true,
                },
                ImportSpecifier {
                    imported: "Subscription".into(),
                    local: "Subscription".into(),
                    type_only: false,
                },
            ],
            namespace: None,
        };
        assert_eq!(
            import.emit(),
            "import { type EndpointRequestInit as EndpointRequestInit_1, Subscription } from \"@vaadin/hilla-frontend\";\n"
        );

        let default = ImportDeclaration {
            module: "./Foo.js".into(),
            type_only: true,
            default: Some("Foo_1".into()),
            named: vec![],
            namespace: None,
        };
        assert_eq!(default.emit(), "import type Foo_1 from \"./Foo.js\";\n");

        let export = ExportDeclaration::Named(vec![ExportSpecifier {
            local: "bar_1".into(),
            exported: "bar".into(),
            type_only: false,
        }]);
        assert_eq!(export.emit(), "export { bar_1 as bar };\n");
    }

    #[test]
    fn test_print_groups_blocks() {
        let file = SourceFile::new(
            "Status.ts",
            vec![
                Statement::Enum(EnumDeclaration {
                    name: "Status".into(),
                    members: vec![
                        ("ACTIVE".into(), "ACTIVE".into()),
                        ("DONE".into(), "DONE".into()),
                    ],
                }),
                Statement::Export(ExportDeclaration::Default("Status".into())),
            ],
        );
        assert_eq!(
            print(&file),
            "enum Status {\n    ACTIVE = \"ACTIVE\",\n    DONE = \"DONE\"\n}\n\nexport default Status;\n"
        );
    }
}
