//! Declaration-tree AST for generated TypeScript files.
//!
//! Processors build these nodes; [`super::emit`] turns them into text. The
//! tree is deliberately small: it covers what the standard plugins emit and
//! nothing else.

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Unknown,
    Void,
    /// The "absent" marker unioned into nullable types.
    Undefined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Bool(bool),
}

/// TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Keyword(Keyword),
    /// Named type with optional generic arguments: `Foo`, `Promise<T>`.
    Reference { name: String, args: Vec<TsType> },
    /// `Array<T>`
    Array(Box<TsType>),
    /// `Record<string, T>`
    Record(Box<TsType>),
    Union(Vec<TsType>),
    Intersection(Vec<TsType>),
    Literal(Literal),
    /// `typeof Foo`
    TypeQuery(String),
    /// Inline object type: `{ a: string; b?: number }`.
    TypeLiteral(Vec<Property>),
}

impl TsType {
    pub const UNDEFINED: TsType = TsType::Keyword(Keyword::Undefined);

    pub fn keyword(keyword: Keyword) -> Self {
        TsType::Keyword(keyword)
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TsType::Reference {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        TsType::Reference {
            name: name.into(),
            args,
        }
    }

    pub fn string_literal(value: impl Into<String>) -> Self {
        TsType::Literal(Literal::String(value.into()))
    }

    /// Builds a flat union, dropping duplicate members. A single member is
    /// returned as-is.
    pub fn union(members: impl IntoIterator<Item = TsType>) -> Self {
        let mut flat: Vec<TsType> = Vec::new();
        for member in members {
            let parts = match member {
                TsType::Union(parts) => parts,
                other => vec![other],
            };
            for part in parts {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }
        match flat.len() {
            0 => TsType::Keyword(Keyword::Unknown),
            1 => flat.remove(0),
            _ => TsType::Union(flat),
        }
    }

    /// `T | undefined`; idempotent.
    pub fn nullable(self) -> Self {
        TsType::union([self, TsType::UNDEFINED])
    }

    pub fn is_nullable(&self) -> bool {
        self.constituents().contains(&&TsType::UNDEFINED)
    }

    /// Members of a union, or the type itself.
    pub fn constituents(&self) -> Vec<&TsType> {
        match self {
            TsType::Union(members) => members.iter().collect(),
            other => vec![other],
        }
    }

    /// Whether the identifier `name` occurs anywhere in the type.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            TsType::Keyword(_) | TsType::Literal(_) => false,
            TsType::Reference { name: target, args } => {
                target == name || args.iter().any(|arg| arg.mentions(name))
            }
            TsType::Array(inner) | TsType::Record(inner) => inner.mentions(name),
            TsType::Union(members) | TsType::Intersection(members) => {
                members.iter().any(|member| member.mentions(name))
            }
            TsType::TypeQuery(target) => target == name,
            TsType::TypeLiteral(properties) => {
                properties.iter().any(|property| property.ty.mentions(name))
            }
        }
    }

    /// The type with any `undefined` member removed.
    pub fn non_nullable(self) -> Self {
        match self {
            TsType::Union(members) => {
                TsType::union(members.into_iter().filter(|m| *m != TsType::UNDEFINED))
            }
            other => other,
        }
    }
}

/// Generic parameter declaration: `T extends Foo = Foo`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<TsType>,
    pub default: Option<TsType>,
}

impl TypeParam {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TsType>,
    pub optional: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            optional: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    This,
    Str(String),
    Bool(bool),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    New { callee: Box<Expr>, args: Vec<Expr> },
    Member { object: Box<Expr>, prop: String },
    /// `object[index]`
    Index { object: Box<Expr>, index: Box<Expr> },
    /// Object literal; a value that is the identifier of its key is printed
    /// in shorthand form.
    Object(Vec<(String, Expr)>),
    Arrow { params: Vec<Param>, body: Box<Expr> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn new_instance(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::New {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: Expr, prop: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            prop: prop.into(),
        }
    }

    pub fn index(object: Expr, index: Expr) -> Self {
        Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    pub fn arrow(params: Vec<Param>, body: Expr) -> Self {
        Expr::Arrow {
            params,
            body: Box::new(body),
        }
    }
}

impl Expr {
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Expr::Ident(ident) => ident == name,
            Expr::This | Expr::Str(_) | Expr::Bool(_) => false,
            Expr::Call { callee, args } | Expr::New { callee, args } => {
                callee.mentions(name) || args.iter().any(|arg| arg.mentions(name))
            }
            Expr::Member { object, .. } => object.mentions(name),
            Expr::Index { object, index } => object.mentions(name) || index.mentions(name),
            Expr::Object(entries) => entries.iter().any(|(_, value)| value.mentions(name)),
            Expr::Arrow { params, body } => {
                params.iter().any(|param| param.mentions(name)) || body.mentions(name)
            }
        }
    }
}

impl Param {
    fn mentions(&self, name: &str) -> bool {
        self.ty.as_ref().is_some_and(|ty| ty.mentions(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Return(Expr),
    Expr(Expr),
}

impl Stmt {
    fn mentions(&self, name: &str) -> bool {
        match self {
            Stmt::Return(expr) | Stmt::Expr(expr) => expr.mentions(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TsType>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDeclaration {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub ty: TsType,
}

/// String enum: every member is initialized with its own literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub name: String,
    pub members: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub is_async: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TsType>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    StaticProperty {
        name: String,
        is_override: bool,
        value: Expr,
    },
    Getter {
        name: String,
        return_type: TsType,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TsType>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDeclaration {
    pub name: String,
    pub ty: Option<TsType>,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: String,
    pub type_only: bool,
}

/// One import statement. `namespace` is never combined with `named`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub module: String,
    pub type_only: bool,
    pub default: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDeclaration {
    Default(String),
    Named(Vec<ExportSpecifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Import(ImportDeclaration),
    Interface(InterfaceDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Enum(EnumDeclaration),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Const(ConstDeclaration),
    Export(ExportDeclaration),
}

impl Statement {
    /// Name introduced into the file scope by a declaration.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Statement::Interface(decl) => Some(&decl.name),
            Statement::TypeAlias(decl) => Some(&decl.name),
            Statement::Enum(decl) => Some(&decl.name),
            Statement::Function(decl) => Some(&decl.name),
            Statement::Class(decl) => Some(&decl.name),
            Statement::Const(decl) => Some(&decl.name),
            Statement::Import(_) | Statement::Export(_) => None,
        }
    }

    /// Whether a declaration or export refers to the identifier `name`.
    /// Imports never count as a use.
    pub fn mentions(&self, name: &str) -> bool {
        let type_params = |params: &[TypeParam]| {
            params.iter().any(|param| {
                param.constraint.as_ref().is_some_and(|ty| ty.mentions(name))
                    || param.default.as_ref().is_some_and(|ty| ty.mentions(name))
            })
        };
        match self {
            Statement::Import(_) => false,
            Statement::Interface(decl) => {
                type_params(&decl.type_params)
                    || decl.extends.iter().any(|ty| ty.mentions(name))
                    || decl.properties.iter().any(|property| property.ty.mentions(name))
            }
            Statement::TypeAlias(decl) => type_params(&decl.type_params) || decl.ty.mentions(name),
            Statement::Enum(_) => false,
            Statement::Function(decl) => {
                decl.params.iter().any(|param| param.mentions(name))
                    || decl.return_type.as_ref().is_some_and(|ty| ty.mentions(name))
                    || decl.body.iter().any(|stmt| stmt.mentions(name))
            }
            Statement::Class(decl) => {
                type_params(&decl.type_params)
                    || decl.extends.as_ref().is_some_and(|ty| ty.mentions(name))
                    || decl.members.iter().any(|member| match member {
                        ClassMember::StaticProperty { value, .. } => value.mentions(name),
                        ClassMember::Getter {
                            return_type, body, ..
                        } => return_type.mentions(name) || body.iter().any(|stmt| stmt.mentions(name)),
                    })
            }
            Statement::Const(decl) => {
                decl.ty.as_ref().is_some_and(|ty| ty.mentions(name)) || decl.init.mentions(name)
            }
            Statement::Export(ExportDeclaration::Default(local)) => local == name,
            Statement::Export(ExportDeclaration::Named(specifiers)) => {
                specifiers.iter().any(|specifier| specifier.local == name)
            }
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Statement::Import(_))
    }

    pub fn is_export(&self) -> bool {
        matches!(self, Statement::Export(_))
    }
}

/// A generated file: a relative path (with `.ts`) and its statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub statements: Vec<Statement>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            statements,
        }
    }

    /// Statements that are neither imports nor exports.
    pub fn declarations(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(|statement| !statement.is_import() && !statement.is_export())
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.statements.iter().find_map(|statement| match statement {
            Statement::Function(function) if function.name == name => Some(function),
            _ => None,
        })
    }

    pub fn exports(&self) -> impl Iterator<Item = &ExportDeclaration> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Export(export) => Some(export),
            _ => None,
        })
    }

    /// Whether anything other than an import uses the identifier `name`.
    pub fn mentions(&self, name: &str) -> bool {
        self.statements.iter().any(|statement| statement.mentions(name))
    }

    /// Local identifier exported under `exported`, if any.
    pub fn exported_local(&self, exported: &str) -> Option<&str> {
        self.exports().find_map(|export| match export {
            ExportDeclaration::Named(specifiers) => specifiers
                .iter()
                .find(|s| s.exported == exported)
                .map(|s| s.local.as_str()),
            ExportDeclaration::Default(_) => None,
        })
    }
}
