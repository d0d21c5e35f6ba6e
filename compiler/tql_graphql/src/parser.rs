//! Recursive-descent parser for GraphQL documents.
//!
//! One grammar covers both schema documents (SDL) and executable documents;
//! callers decide which definitions they accept.
//!
//! Selection sets, value literals and type references may nest at most
//! [`MAX_NESTING`] levels deep, counted together. Deeper input is a
//! [`SyntaxError`].

mod cursor;

use crate::ast::{
    Argument, Definition, Directive, DirectiveDefinition, Document, Field, FieldDefinition,
    FragmentDefinition, FragmentSpread, InlineFragment, InputValueDefinition,
    OperationDefinition, OperationKind, SchemaDefinition, Selection, SelectionSet,
    TypeDefinition, TypeDefinitionKind, TypeRef, Value, VariableDefinition,
};
use crate::lexer::{tokenize, Span, SyntaxError, TokenKind};
use tql_stack::ensure_sufficient_stack;

use cursor::Cursor;

/// Deepest nesting of selection sets, values and type references accepted
/// in one document.
pub const MAX_NESTING: usize = 256;

/// Parse a GraphQL document.
pub fn parse_document(source: &str) -> Result<Document, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        cursor: Cursor::new(&tokens, source.len()),
        depth: 0,
    };
    parser.document()
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    depth: usize,
}

impl Parser<'_> {
    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new(
                format!("document nests deeper than {MAX_NESTING} levels"),
                self.cursor.current_span(),
            ));
        }
        self.depth += 1;
        let parsed = ensure_sufficient_stack(|| parse(self));
        self.depth -= 1;
        parsed
    }

    fn document(&mut self) -> Result<Document, SyntaxError> {
        let mut definitions = Vec::new();
        while !self.cursor.is_at_end() {
            definitions.push(self.definition()?);
        }
        if definitions.is_empty() {
            return Err(SyntaxError::new(
                "document contains no definitions",
                self.cursor.current_span(),
            ));
        }
        Ok(Document { definitions })
    }

    fn definition(&mut self) -> Result<Definition, SyntaxError> {
        if self.cursor.check(&TokenKind::LBrace) {
            return self.anonymous_query().map(Definition::Operation);
        }
        // Descriptions only precede type system definitions.
        let described = self.skip_description();
        let start = self.cursor.current_span();
        let Some(TokenKind::Name(keyword)) = self.cursor.current_kind() else {
            return Err(self.cursor.unexpected("a definition"));
        };
        match keyword.as_str() {
            "query" | "mutation" | "subscription" if !described => {
                self.operation().map(Definition::Operation)
            }
            "fragment" if !described => self.fragment_definition().map(Definition::Fragment),
            "schema" => self.schema_definition(start).map(Definition::Schema),
            "directive" => self.directive_definition(start).map(Definition::Directive),
            "extend" => {
                self.cursor.advance();
                self.type_definition(start, true).map(Definition::Type)
            }
            _ => self.type_definition(start, false).map(Definition::Type),
        }
    }

    fn skip_description(&mut self) -> bool {
        self.cursor.eat(&TokenKind::String(String::new()))
            || self.cursor.eat(&TokenKind::BlockString(String::new()))
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    // ── Operations ──────────────────────────────────────────────────

    fn anonymous_query(&mut self) -> Result<OperationDefinition, SyntaxError> {
        let start = self.cursor.current_span();
        let selection_set = self.selection_set()?;
        Ok(OperationDefinition {
            kind: OperationKind::Query,
            name: None,
            variables: Vec::new(),
            directives: Vec::new(),
            selection_set,
            span: self.span_from(start),
        })
    }

    fn operation(&mut self) -> Result<OperationDefinition, SyntaxError> {
        let start = self.cursor.current_span();
        let keyword = self.cursor.expect_name()?;
        let kind = OperationKind::from_keyword(&keyword)
            .ok_or_else(|| SyntaxError::new(format!("unknown operation `{keyword}`"), start))?;
        let name = match self.cursor.current_kind() {
            Some(TokenKind::Name(_)) => Some(self.cursor.expect_name()?),
            _ => None,
        };
        let variables = if self.cursor.check(&TokenKind::LParen) {
            self.variable_definitions()?
        } else {
            Vec::new()
        };
        let directives = self.directives(false)?;
        let selection_set = self.selection_set()?;
        Ok(OperationDefinition {
            kind,
            name,
            variables,
            directives,
            selection_set,
            span: self.span_from(start),
        })
    }

    fn variable_definitions(&mut self) -> Result<Vec<VariableDefinition>, SyntaxError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut variables = Vec::new();
        while !self.cursor.eat(&TokenKind::RParen) {
            let start = self.cursor.expect(&TokenKind::Dollar)?;
            let name = self.cursor.expect_name()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let ty = self.type_ref()?;
            let default = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.value(true)?)
            } else {
                None
            };
            // Directives on variables are accepted and dropped.
            self.directives(true)?;
            variables.push(VariableDefinition {
                name,
                ty,
                default,
                span: self.span_from(start),
            });
        }
        Ok(variables)
    }

    fn selection_set(&mut self) -> Result<SelectionSet, SyntaxError> {
        self.nested(Self::selection_set_inner)
    }

    fn selection_set_inner(&mut self) -> Result<SelectionSet, SyntaxError> {
        let start = self.cursor.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.cursor.eat(&TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(self.cursor.unexpected("`}`"));
            }
            items.push(self.selection()?);
        }
        if items.is_empty() {
            return Err(SyntaxError::new(
                "selection set must not be empty",
                self.span_from(start),
            ));
        }
        Ok(SelectionSet {
            items,
            span: self.span_from(start),
        })
    }

    fn selection(&mut self) -> Result<Selection, SyntaxError> {
        if !self.cursor.check(&TokenKind::Spread) {
            return self.field().map(Selection::Field);
        }
        let start = self.cursor.expect(&TokenKind::Spread)?;
        let spread_name = match self.cursor.current_kind() {
            Some(TokenKind::Name(name)) if name != "on" => Some(name.clone()),
            _ => None,
        };
        if let Some(name) = spread_name {
            self.cursor.advance();
            let directives = self.directives(false)?;
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                span: self.span_from(start),
            }));
        }
        let type_condition = if self.cursor.check_keyword("on") {
            self.cursor.advance();
            Some(self.cursor.expect_name()?)
        } else {
            None
        };
        let directives = self.directives(false)?;
        let selection_set = self.selection_set()?;
        Ok(Selection::InlineFragment(InlineFragment {
            type_condition,
            directives,
            selection_set,
            span: self.span_from(start),
        }))
    }

    fn field(&mut self) -> Result<Field, SyntaxError> {
        let start = self.cursor.current_span();
        let first = self.cursor.expect_name()?;
        let (alias, name) = if self.cursor.eat(&TokenKind::Colon) {
            (Some(first), self.cursor.expect_name()?)
        } else {
            (None, first)
        };
        let arguments = self.arguments(false)?;
        let directives = self.directives(false)?;
        let selection_set = if self.cursor.check(&TokenKind::LBrace) {
            Some(self.selection_set()?)
        } else {
            None
        };
        Ok(Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            span: self.span_from(start),
        })
    }

    fn fragment_definition(&mut self) -> Result<FragmentDefinition, SyntaxError> {
        let start = self.cursor.expect_keyword("fragment")?;
        let name = self.cursor.expect_name()?;
        if name == "on" {
            return Err(SyntaxError::new("fragment cannot be named `on`", start));
        }
        self.cursor.expect_keyword("on")?;
        let type_condition = self.cursor.expect_name()?;
        let directives = self.directives(false)?;
        let selection_set = self.selection_set()?;
        Ok(FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            span: self.span_from(start),
        })
    }

    // ── Arguments, directives, values ───────────────────────────────

    fn arguments(&mut self, constant: bool) -> Result<Vec<Argument>, SyntaxError> {
        let mut arguments = Vec::new();
        if !self.cursor.eat(&TokenKind::LParen) {
            return Ok(arguments);
        }
        while !self.cursor.eat(&TokenKind::RParen) {
            let start = self.cursor.current_span();
            let name = self.cursor.expect_name()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let value = self.value(constant)?;
            arguments.push(Argument {
                name,
                value,
                span: self.span_from(start),
            });
        }
        Ok(arguments)
    }

    fn directives(&mut self, constant: bool) -> Result<Vec<Directive>, SyntaxError> {
        let mut directives = Vec::new();
        while self.cursor.check(&TokenKind::At) {
            let start = self.cursor.expect(&TokenKind::At)?;
            let name = self.cursor.expect_name()?;
            let arguments = self.arguments(constant)?;
            directives.push(Directive {
                name,
                arguments,
                span: self.span_from(start),
            });
        }
        Ok(directives)
    }

    /// A value literal. `constant` forbids variables (defaults, SDL).
    fn value(&mut self, constant: bool) -> Result<Value, SyntaxError> {
        self.nested(|parser| parser.value_inner(constant))
    }

    fn value_inner(&mut self, constant: bool) -> Result<Value, SyntaxError> {
        let span = self.cursor.current_span();
        let Some(token) = self.cursor.current() else {
            return Err(self.cursor.unexpected("a value"));
        };
        let value = match &token.kind {
            TokenKind::Dollar if constant => {
                return Err(SyntaxError::new("variables are not allowed here", span));
            }
            TokenKind::Dollar => {
                self.cursor.advance();
                return Ok(Value::Variable(self.cursor.expect_name()?));
            }
            TokenKind::Int(n) => Value::Int(*n),
            TokenKind::Float(n) => Value::Float(*n),
            TokenKind::String(s) | TokenKind::BlockString(s) => Value::String(s.clone()),
            TokenKind::Name(name) => match name.as_str() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                "null" => Value::Null,
                _ => Value::Enum(name.clone()),
            },
            TokenKind::LBracket => {
                self.cursor.advance();
                let mut items = Vec::new();
                while !self.cursor.eat(&TokenKind::RBracket) {
                    if self.cursor.is_at_end() {
                        return Err(self.cursor.unexpected("`]`"));
                    }
                    items.push(self.value(constant)?);
                }
                return Ok(Value::List(items));
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                let mut fields = Vec::new();
                while !self.cursor.eat(&TokenKind::RBrace) {
                    let name = self.cursor.expect_name()?;
                    self.cursor.expect(&TokenKind::Colon)?;
                    fields.push((name, self.value(constant)?));
                }
                return Ok(Value::Object(fields));
            }
            _ => return Err(self.cursor.unexpected("a value")),
        };
        self.cursor.advance();
        Ok(value)
    }

    fn type_ref(&mut self) -> Result<TypeRef, SyntaxError> {
        self.nested(Self::type_ref_inner)
    }

    fn type_ref_inner(&mut self) -> Result<TypeRef, SyntaxError> {
        let inner = if self.cursor.eat(&TokenKind::LBracket) {
            let item = self.type_ref()?;
            self.cursor.expect(&TokenKind::RBracket)?;
            TypeRef::List(Box::new(item))
        } else {
            TypeRef::Named(self.cursor.expect_name()?)
        };
        if self.cursor.eat(&TokenKind::Bang) {
            Ok(TypeRef::NonNull(Box::new(inner)))
        } else {
            Ok(inner)
        }
    }

    // ── Type system ─────────────────────────────────────────────────

    fn schema_definition(&mut self, start: Span) -> Result<SchemaDefinition, SyntaxError> {
        self.cursor.expect_keyword("schema")?;
        self.directives(true)?;
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut operation_types = Vec::new();
        while !self.cursor.eat(&TokenKind::RBrace) {
            let span = self.cursor.current_span();
            let keyword = self.cursor.expect_name()?;
            let kind = OperationKind::from_keyword(&keyword).ok_or_else(|| {
                SyntaxError::new(format!("unknown root operation `{keyword}`"), span)
            })?;
            self.cursor.expect(&TokenKind::Colon)?;
            operation_types.push((kind, self.cursor.expect_name()?));
        }
        Ok(SchemaDefinition {
            operation_types,
            span: self.span_from(start),
        })
    }

    fn type_definition(
        &mut self,
        start: Span,
        extension: bool,
    ) -> Result<TypeDefinition, SyntaxError> {
        let keyword_span = self.cursor.current_span();
        let keyword = self.cursor.expect_name()?;
        let name = self.cursor.expect_name()?;
        let (kind, directives) = match keyword.as_str() {
            "scalar" => (TypeDefinitionKind::Scalar, self.directives(true)?),
            "type" | "interface" => {
                let interfaces = self.implements()?;
                let directives = self.directives(true)?;
                let fields = self.field_definitions()?;
                let kind = if keyword == "type" {
                    TypeDefinitionKind::Object { interfaces, fields }
                } else {
                    TypeDefinitionKind::Interface { interfaces, fields }
                };
                (kind, directives)
            }
            "enum" => {
                let directives = self.directives(true)?;
                let values = self.enum_values()?;
                (TypeDefinitionKind::Enum { values }, directives)
            }
            "input" => {
                let directives = self.directives(true)?;
                let fields = self.input_values(&TokenKind::LBrace, &TokenKind::RBrace)?;
                (TypeDefinitionKind::InputObject { fields }, directives)
            }
            other => {
                return Err(SyntaxError::new(
                    format!("unsupported definition `{other}`"),
                    keyword_span,
                ));
            }
        };
        Ok(TypeDefinition {
            name,
            kind,
            directives,
            extension,
            span: self.span_from(start),
        })
    }

    fn implements(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut interfaces = Vec::new();
        if !self.cursor.check_keyword("implements") {
            return Ok(interfaces);
        }
        self.cursor.advance();
        self.cursor.eat(&TokenKind::Amp);
        interfaces.push(self.cursor.expect_name()?);
        while self.cursor.eat(&TokenKind::Amp) {
            interfaces.push(self.cursor.expect_name()?);
        }
        Ok(interfaces)
    }

    fn field_definitions(&mut self) -> Result<Vec<FieldDefinition>, SyntaxError> {
        let mut fields = Vec::new();
        if !self.cursor.eat(&TokenKind::LBrace) {
            return Ok(fields);
        }
        while !self.cursor.eat(&TokenKind::RBrace) {
            self.skip_description();
            let start = self.cursor.current_span();
            let name = self.cursor.expect_name()?;
            let arguments = if self.cursor.check(&TokenKind::LParen) {
                self.input_values(&TokenKind::LParen, &TokenKind::RParen)?
            } else {
                Vec::new()
            };
            self.cursor.expect(&TokenKind::Colon)?;
            let ty = self.type_ref()?;
            let directives = self.directives(true)?;
            fields.push(FieldDefinition {
                name,
                arguments,
                ty,
                directives,
                span: self.span_from(start),
            });
        }
        Ok(fields)
    }

    fn input_values(
        &mut self,
        open: &TokenKind,
        close: &TokenKind,
    ) -> Result<Vec<InputValueDefinition>, SyntaxError> {
        let mut values = Vec::new();
        if !self.cursor.eat(open) {
            return Ok(values);
        }
        while !self.cursor.eat(close) {
            self.skip_description();
            let start = self.cursor.current_span();
            let name = self.cursor.expect_name()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let ty = self.type_ref()?;
            let default = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.value(true)?)
            } else {
                None
            };
            let directives = self.directives(true)?;
            values.push(InputValueDefinition {
                name,
                ty,
                default,
                directives,
                span: self.span_from(start),
            });
        }
        Ok(values)
    }

    fn enum_values(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut values = Vec::new();
        if !self.cursor.eat(&TokenKind::LBrace) {
            return Ok(values);
        }
        while !self.cursor.eat(&TokenKind::RBrace) {
            self.skip_description();
            let span = self.cursor.current_span();
            let value = self.cursor.expect_name()?;
            if matches!(value.as_str(), "true" | "false" | "null") {
                return Err(SyntaxError::new(
                    format!("`{value}` cannot be an enum value"),
                    span,
                ));
            }
            self.directives(true)?;
            values.push(value);
        }
        Ok(values)
    }

    fn directive_definition(&mut self, start: Span) -> Result<DirectiveDefinition, SyntaxError> {
        self.cursor.expect_keyword("directive")?;
        self.cursor.expect(&TokenKind::At)?;
        let name = self.cursor.expect_name()?;
        let arguments = if self.cursor.check(&TokenKind::LParen) {
            self.input_values(&TokenKind::LParen, &TokenKind::RParen)?
        } else {
            Vec::new()
        };
        let repeatable = self.cursor.check_keyword("repeatable");
        if repeatable {
            self.cursor.advance();
        }
        self.cursor.expect_keyword("on")?;
        self.cursor.eat(&TokenKind::Pipe);
        let mut locations = vec![self.cursor.expect_name()?];
        while self.cursor.eat(&TokenKind::Pipe) {
            locations.push(self.cursor.expect_name()?);
        }
        Ok(DirectiveDefinition {
            name,
            arguments,
            repeatable,
            locations,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
