//! Class model assembled from prototype-based pseudo-classes
//!
//! A constructor function, an inheritance-wiring call and the prototype
//! member declarations sharing its namespace are correlated into one
//! [`ClassDef`] and re-emitted as a single ES6 class block. The member
//! kind is always derived from the shape of the body and documentation
//! text, never stored.

use crate::text;
use once_cell::sync::Lazy;
use regex::Regex;

/// `<root>.inherits(Sub, Super);`
#[derive(Debug, Clone)]
pub struct InheritsDecl {
    pub matched_text: String,
    pub sub: String,
    pub superclass: String,
}

/// `Ns.prototype.member = …;` or `Ns.prototype.member;`
#[derive(Debug, Clone)]
pub struct ClassMember {
    /// Full source span: doc comment, declaration and definition.
    pub matched_text: String,
    pub doc: String,
    pub class_namespace: String,
    pub name: String,
    /// `;` for an uninitialized member, otherwise the `= …;` tail.
    pub body: String,
}

/// Constructor-function declaration carrying the class doc comment.
#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub matched_text: String,
    pub doc: String,
    /// `const `/`let `/`var ` prefix when the constructor was bound to a
    /// local instead of a namespace path.
    pub binding: Option<String>,
    pub class_namespace: String,
    pub body: String,
}

/// One pseudo-class, transient within a single converter run over a file.
#[derive(Debug)]
pub struct ClassDef {
    pub constructor: ConstructorDecl,
    pub inherits: Option<InheritsDecl>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    AbstractMethod,
    DelegatedMethod,
    Field,
    UninitializedField,
}

impl MemberKind {
    pub fn is_method(self) -> bool {
        matches!(
            self,
            Self::Method | Self::AbstractMethod | Self::DelegatedMethod
        )
    }
}

/// `= Something.prototype.member;` — delegation to a prototype method.
static METHOD_DELEGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*=\s*[\w.\s]+\s*\.\s*prototype\s*\.\s*(\w+);").unwrap()
});

/// `= some.other.fn;` — delegation to a plain function.
static FUNCTION_DELEGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*=\s*[\w.\s]+\.(\w+);$").unwrap());

/// `@type {…undefined…}` where `undefined` is a union member, not part of
/// a generic argument like `Array<undefined>`.
static TYPE_WITH_UNDEFINED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@type \{[^}]*undefined(?:[^>][^}]*)?\}").unwrap());

/// Primitive non-nullable types whose uninitialized fields need `|null`
/// added to stay honest about the synthesized initializer.
static PRIMITIVE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@type \{(?:number|boolean|string)\}").unwrap());

static VISIBILITY_SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\* @(private|protected|public) \{").unwrap());

static TYPE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@type \{(.*)\}").unwrap());

static FUNCTION_TYPE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\* @type \{function\(\) : void\}\r?\n").unwrap());

static DOC_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\s*)\*/\s*$").unwrap());

static PARAM_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r" \* @param.*\n?").unwrap());

static CONSTRUCTOR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"( \*)? @constructor\n?").unwrap());

static FINAL_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\* @final\n").unwrap());

static EXTENDS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\* @extends.*\n").unwrap());

impl ClassMember {
    /// Derive the member kind from the body/documentation shape.
    pub fn kind(&self, root: &str) -> MemberKind {
        if self.is_explicit_abstract(root) {
            return MemberKind::AbstractMethod;
        }
        if self.is_method(root) {
            if self.has_no_initializer() {
                return MemberKind::AbstractMethod;
            }
            if FUNCTION_DELEGATION.is_match(&self.body) {
                return MemberKind::DelegatedMethod;
            }
            return MemberKind::Method;
        }
        if self.has_no_initializer() {
            MemberKind::UninitializedField
        } else {
            MemberKind::Field
        }
    }

    pub fn is_abstract(&self, root: &str) -> bool {
        self.doc.contains("@abstract") || self.is_explicit_abstract(root)
    }

    fn has_no_initializer(&self) -> bool {
        self.body == ";"
    }

    fn is_explicit_abstract(&self, root: &str) -> bool {
        match self.body.trim().strip_prefix('=') {
            Some(rest) => rest.trim() == format!("{root}.abstractMethod;"),
            None => false,
        }
    }

    fn is_method(&self, root: &str) -> bool {
        let value = self.body.trim_start();
        let value = value.strip_prefix('=').unwrap_or(value).trim_start();
        value.starts_with("function")
            || (value.starts_with(&format!("{root}.nullFunction;"))
                && !self.doc.contains("{Function}"))
            || self.doc.contains("@param")
            || self.doc.contains("@return")
            || self.is_explicit_abstract(root)
    }

    /// Doc comment adjusted for the member's emitted shape.
    fn emitted_doc(&self, root: &str) -> String {
        let doc = VISIBILITY_SHORTHAND
            .replace_all(&self.doc, "* @$1\n  * @type {")
            .to_string();
        if self.is_explicit_abstract(root) {
            let doc = FUNCTION_TYPE_LINE.replace_all(&doc, "").to_string();
            return DOC_END.replace(&doc, "${1}* @abstract${0}").to_string();
        }
        if self.has_no_initializer() && PRIMITIVE_TYPE.is_match(&doc) {
            return TYPE_TAG.replace_all(&doc, "@type {$1|null}").to_string();
        }
        doc
    }

    /// ES6 method body for method-kinded members.
    fn method_declaration(&self, inherits: Option<&InheritsDecl>, root: &str) -> String {
        let params = text::inferred_parameter_list(&self.doc);
        if self.has_no_initializer() || self.is_explicit_abstract(root) {
            return format!("{}({params}) {{}}", self.name);
        }
        if FUNCTION_DELEGATION.is_match(&self.body) {
            if let Some(captures) = METHOD_DELEGATION.captures(&self.body) {
                let delegate = &captures[1];
                return format!(
                    "{}({params}) {{\n  return this.{delegate}({params});\n}}",
                    self.name
                );
            }
            let delegate = self
                .body
                .trim()
                .trim_start_matches('=')
                .trim()
                .trim_end_matches(';');
            if delegate == format!("{root}.nullFunction") {
                return format!("{}({params}) {{\n}}", self.name);
            }
            return format!(
                "{}({params}) {{\n  return {delegate}({params});\n}}",
                self.name
            );
        }
        let declaration = replace_first_function_keyword(&self.body, &self.name);
        rewrite_super_calls(&declaration, inherits, root)
    }

    /// ES6 field initializer (used inside the constructor body).
    fn field_declaration(&self) -> String {
        let mut body = self.body.clone();
        if self.has_no_initializer() {
            body = if TYPE_WITH_UNDEFINED.is_match(&self.doc) {
                " = undefined;".to_string()
            } else {
                " = null;".to_string()
            };
        }
        prefix_assignment(&body, &self.name)
    }

    pub fn render(&self, inherits: Option<&InheritsDecl>, root: &str) -> String {
        let doc = self.emitted_doc(root);
        if self.kind(root).is_method() {
            format!("{doc}{}", self.method_declaration(inherits, root))
        } else {
            format!("{doc}{}", self.field_declaration())
        }
    }
}

impl ConstructorDecl {
    /// The `constructor(…) {…}` block: super-call rewrites applied, a
    /// `super();` synthesized when the class inherits without calling its
    /// base constructor, and field initializers appended to the body.
    pub fn emitted(
        &self,
        members: &[ClassMember],
        inherits: Option<&InheritsDecl>,
        root: &str,
    ) -> String {
        let comment = FINAL_LINE.replace_all(&self.doc, "");
        let comment = EXTENDS_LINE.replace_all(&comment, "").to_string();

        let mut definition = replace_first_function_keyword(&self.body, "constructor");
        definition = rewrite_super_calls(&definition, inherits, root);

        if inherits.is_some() && !definition.contains("super(") {
            if let Some(brace) = definition.find('{') {
                definition.insert_str(brace + 1, "\n  super();");
            }
        }

        let mut extension = String::new();
        for member in members {
            if member.kind(root).is_method() {
                continue;
            }
            extension.push_str(&member.emitted_doc(root));
            extension.push_str(&member.field_declaration());
        }

        let trimmed = definition.trim_end();
        let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
        let body = match trimmed.strip_suffix('}') {
            Some(head) => format!("{head}{extension}}}"),
            None => format!("{trimmed}{extension}"),
        };
        format!("{comment}\n{body}")
    }
}

impl ClassDef {
    /// Class-level doc comment: parameter and constructor tags belong to
    /// the constructor now; `@abstract` is added when an abstract member
    /// exists and the class is not already marked interface/abstract.
    fn class_doc(&self, root: &str) -> String {
        let doc = PARAM_LINE.replace_all(&self.constructor.doc, "");
        let doc = CONSTRUCTOR_TAG.replace_all(&doc, "").to_string();
        let needs_abstract = self.members.iter().any(|m| m.is_abstract(root))
            && !doc.contains("@interface")
            && !doc.contains("@abstract");
        if needs_abstract {
            return DOC_END.replace(&doc, "${1}* @abstract${0}").to_string();
        }
        doc
    }

    /// The full `Ns = class [extends Super] { … }` block replacing the
    /// constructor's original span.
    pub fn emit(&self, root: &str) -> String {
        let mut out = String::new();
        out.push_str(&self.class_doc(root));
        if let Some(binding) = &self.constructor.binding {
            out.push_str(binding);
        }
        out.push_str(&self.constructor.class_namespace);
        out.push_str(" = class ");
        if let Some(inherits) = &self.inherits {
            out.push_str("extends ");
            out.push_str(&inherits.superclass);
            out.push(' ');
        }
        out.push_str("{\n\n");
        out.push_str(&text::indent_code(&self.constructor.emitted(
            &self.members,
            self.inherits.as_ref(),
            root,
        )));
        for member in &self.members {
            if member.kind(root).is_method() {
                out.push_str("\n\n");
                out.push_str(&text::indent_code(
                    &member.render(self.inherits.as_ref(), root),
                ));
            }
        }
        out.push_str("\n}");
        out
    }
}

/// Insert `this.name` in front of the `= …` initializer.
fn prefix_assignment(body: &str, name: &str) -> String {
    static ASSIGN_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s?=\s*").unwrap());
    ASSIGN_HEAD
        .replace(body, |captures: &regex::Captures| {
            format!("this.{name}{}", &captures[0])
        })
        .to_string()
}

/// Turn `= function(args) {…}` into `name(args) {…}`.
fn replace_first_function_keyword(body: &str, name: &str) -> String {
    static FUNCTION_HEAD: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s?=\s*function").unwrap());
    FUNCTION_HEAD
        .replace(body, text::replacement_literal(name))
        .to_string()
}

/// Rewrite the legacy base/superClass_ delegation patterns to `super`.
fn rewrite_super_calls(
    declaration: &str,
    inherits: Option<&InheritsDecl>,
    _root: &str,
) -> String {
    let Some(inherits) = inherits else {
        return declaration.to_string();
    };
    let base = text::namespace_pattern(&format!("{}.base", inherits.sub));
    let super_class = text::namespace_pattern(&format!("{}.superClass_.", inherits.sub));

    let constructor_call =
        Regex::new(&format!(r"{base}\(\s*this,\s*'constructor',?\s*")).unwrap();
    let declaration = constructor_call.replace_all(declaration, "super(");

    let method_call = Regex::new(&format!(r"{base}\(\s*this,\s*'(\w+)',?\s*")).unwrap();
    let declaration = method_call.replace_all(&declaration, "super.$1(");

    let super_method =
        Regex::new(&format!(r"{super_class}(\w+)\s*\.\s*call\s*\(\s*this,?\s*")).unwrap();
    super_method.replace_all(&declaration, "super.$1(").to_string()
}
