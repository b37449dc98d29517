//! Declaration printer.
//!
//! Statements print one per line with four-space indentation inside braces.
//! Types print inline, with parentheses added wherever operator precedence
//! requires them; the tree carries no parentheses of its own except
//! `TypeNode::Parenthesized`.

use crate::source_writer::SourceWriter;
use dtsz_common::limits::EMIT_BUFFER_CAPACITY;
use dtsz_syntax::{
    BundledFile, Declaration, DeclarationKind, EntityName, ExportClause, ExternalImport,
    HeritageType, MappedModifier, Member, Modifiers, OpaqueToken, Parameter, PropertyName,
    Statement, TupleElement, TypeNode, TypeParameter,
};
use tracing::debug;

/// Printed text of one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintResult {
    pub code: String,
    pub source_map: Option<String>,
}

/// Print `file`, with a source map when `source_map` is set.
#[tracing::instrument(level = "debug", skip_all, fields(file = %file.file_name))]
pub fn print(file: &BundledFile, source_map: bool) -> PrintResult {
    let mut printer = DeclarationPrinter::new();
    if source_map {
        printer.enable_source_map(&file.file_name);
    }
    printer.print_file(file);
    let (code, source_map) = printer.finish();
    debug!(bytes = code.len(), "printed bundle");
    PrintResult { code, source_map }
}

/// Binding strength of a type in the position it is printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    /// Function, constructor and conditional types.
    Lowest,
    Union,
    Intersection,
    /// `keyof T`, `infer U`, `unique symbol`
    Prefix,
    /// `T[]`, `T[K]`
    Postfix,
    Primary,
}

pub struct DeclarationPrinter {
    writer: SourceWriter,
    indent_level: u32,
    /// Inside a namespace body `declare` is implied and must not be printed.
    inside_namespace: bool,
}

impl Default for DeclarationPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationPrinter {
    pub fn new() -> Self {
        DeclarationPrinter {
            writer: SourceWriter::with_capacity(EMIT_BUFFER_CAPACITY),
            indent_level: 0,
            inside_namespace: false,
        }
    }

    pub fn enable_source_map(&mut self, file: &str) {
        self.writer.enable_source_map(file);
    }

    pub fn finish(self) -> (String, Option<String>) {
        self.writer.finish()
    }

    pub fn print_file(&mut self, file: &BundledFile) {
        for import in &file.imports {
            self.print_external_import(import);
        }
        for bundled in &file.statements {
            self.write_indent();
            if let (Some(origin), Some(pos)) = (&bundled.origin, bundled.pos) {
                self.writer.add_mapping(origin, pos);
            }
            self.print_statement(&bundled.statement);
            self.write_line();
        }
        self.print_export_clause(&file.export, file.module_marker);
    }

    fn write(&mut self, text: &str) {
        self.writer.write(text);
    }

    fn write_line(&mut self) {
        self.writer.write_line();
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.write("    ");
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn write_string_literal(&mut self, value: &str) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        self.write("\"");
        self.write(&escaped);
        self.write("\"");
    }

    // =========================================================================
    // Imports and the export clause
    // =========================================================================

    fn print_external_import(&mut self, import: &ExternalImport) {
        // A namespace import cannot share a statement with named imports.
        if let Some(namespace) = &import.namespace {
            self.write("import * as ");
            self.write(namespace);
            self.write(" from ");
            self.write_string_literal(&import.specifier);
            self.write(";");
            self.write_line();
        }
        if !import.named.is_empty() {
            self.write("import { ");
            for (i, specifier) in import.named.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write_specifier(&specifier.imported, &specifier.local);
            }
            self.write(" } from ");
            self.write_string_literal(&import.specifier);
            self.write(";");
            self.write_line();
        }
    }

    /// `a` or `a as b`
    fn write_specifier(&mut self, from: &str, to: &str) {
        self.write(from);
        if from != to {
            self.write(" as ");
            self.write(to);
        }
    }

    fn print_export_clause(&mut self, clause: &ExportClause, module_marker: bool) {
        for specifier in &clause.external_stars {
            self.write("export * from ");
            self.write_string_literal(specifier);
            self.write(";");
            self.write_line();
        }
        if !clause.entries.is_empty() {
            self.write("export { ");
            for (i, entry) in clause.entries.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write_specifier(&entry.local, &entry.exported);
            }
            self.write(" };");
            self.write_line();
        }
        if let Some(assignment) = &clause.assignment {
            self.write("export = ");
            self.write(assignment);
            self.write(";");
            self.write_line();
        }
        if clause.is_empty() && module_marker {
            self.write("export {};");
            self.write_line();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Print one statement at the current position, without the trailing newline.
    pub fn print_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Declaration(decl) => self.print_declaration(decl),
            Statement::Import(import) => {
                self.write("import ");
                if import.type_only {
                    self.write("type ");
                }
                let mut wrote = false;
                if let Some(default) = &import.default {
                    self.write(default);
                    wrote = true;
                }
                if let Some(namespace) = &import.namespace {
                    if wrote {
                        self.write(", ");
                    }
                    self.write("* as ");
                    self.write(namespace);
                    wrote = true;
                }
                if !import.named.is_empty() {
                    if wrote {
                        self.write(", ");
                    }
                    self.write("{ ");
                    for (i, specifier) in import.named.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.write_specifier(&specifier.imported, &specifier.local);
                    }
                    self.write(" }");
                }
                self.write(" from ");
                self.write_string_literal(&import.source);
                self.write(";");
            }
            Statement::Export(export) => {
                self.write("export ");
                if export.type_only {
                    self.write("type ");
                }
                if export.specifiers.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{ ");
                    for (i, specifier) in export.specifiers.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.write_specifier(&specifier.local, &specifier.exported);
                    }
                    self.write(" }");
                }
                if let Some(source) = &export.source {
                    self.write(" from ");
                    self.write_string_literal(source);
                }
                self.write(";");
            }
            Statement::ExportAll(all) => {
                self.write("export * ");
                if let Some(alias) = &all.alias {
                    self.write("as ");
                    self.write(alias);
                    self.write(" ");
                }
                self.write("from ");
                self.write_string_literal(&all.source);
                self.write(";");
            }
            Statement::ExportDefault(default) => {
                self.write("export default ");
                self.write(&default.expression);
                self.write(";");
            }
            Statement::ExportAssignment(assignment) => {
                self.write("export = ");
                self.write(&assignment.expression);
                self.write(";");
            }
            Statement::Opaque(opaque) => self.print_tokens(&opaque.tokens),
        }
    }

    fn print_tokens(&mut self, tokens: &[OpaqueToken]) {
        for token in tokens {
            match token {
                OpaqueToken::Text { text } => self.writer.write_multiline(text),
                OpaqueToken::Identifier { name } => self.write(name),
            }
        }
    }

    fn print_modifiers(&mut self, modifiers: Modifiers) {
        let modifiers = if self.inside_namespace {
            modifiers - Modifiers::DECLARE
        } else {
            modifiers
        };
        for keyword in modifiers.keywords() {
            self.write(keyword);
            self.write(" ");
        }
    }

    fn print_declaration(&mut self, decl: &Declaration) {
        self.print_modifiers(decl.modifiers);
        match &decl.kind {
            DeclarationKind::Interface(iface) => {
                self.write("interface ");
                self.write(&iface.name);
                self.print_type_parameters(&iface.type_parameters);
                if !iface.extends.is_empty() {
                    self.write(" extends ");
                    self.print_heritage_list(&iface.extends);
                }
                self.write(" ");
                self.print_member_block(&iface.members);
            }
            DeclarationKind::Class(class) => {
                self.write("class");
                if let Some(name) = &class.name {
                    self.write(" ");
                    self.write(name);
                }
                self.print_type_parameters(&class.type_parameters);
                if let Some(extends) = &class.extends {
                    self.write(" extends ");
                    self.print_heritage(extends);
                }
                if !class.implements.is_empty() {
                    self.write(" implements ");
                    self.print_heritage_list(&class.implements);
                }
                self.write(" ");
                self.print_member_block(&class.members);
            }
            DeclarationKind::Function(function) => {
                self.write("function");
                if let Some(name) = &function.name {
                    self.write(" ");
                    self.write(name);
                }
                self.print_signature(
                    &function.type_parameters,
                    &function.parameters,
                    function.return_type.as_ref(),
                );
                self.write(";");
            }
            DeclarationKind::Variable(vars) => {
                self.write(vars.flavor.keyword());
                self.write(" ");
                for (i, declarator) in vars.declarations.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(&declarator.name);
                    if let Some(ty) = &declarator.type_annotation {
                        self.write(": ");
                        self.print_type(ty);
                    }
                    if let Some(initializer) = &declarator.initializer {
                        self.write(" = ");
                        self.write(initializer);
                    }
                }
                self.write(";");
            }
            DeclarationKind::Enum(enumeration) => {
                self.write("enum ");
                self.write(&enumeration.name);
                self.write(" {");
                self.write_line();
                self.increase_indent();
                for member in &enumeration.members {
                    self.write_indent();
                    self.write(&member.name);
                    if let Some(initializer) = &member.initializer {
                        self.write(" = ");
                        self.write(initializer);
                    }
                    self.write(",");
                    self.write_line();
                }
                self.decrease_indent();
                self.write_indent();
                self.write("}");
            }
            DeclarationKind::TypeAlias(alias) => {
                self.write("type ");
                self.write(&alias.name);
                self.print_type_parameters(&alias.type_parameters);
                self.write(" = ");
                self.print_type(&alias.target);
                self.write(";");
            }
            DeclarationKind::Namespace(namespace) => {
                self.write(if namespace.module_keyword {
                    "module "
                } else {
                    "namespace "
                });
                self.write(&namespace.name);
                if namespace.body.is_empty() {
                    self.write(" { }");
                    return;
                }
                self.write(" {");
                self.write_line();
                let outer = std::mem::replace(&mut self.inside_namespace, true);
                self.increase_indent();
                for statement in &namespace.body {
                    self.write_indent();
                    self.print_statement(statement);
                    self.write_line();
                }
                self.decrease_indent();
                self.inside_namespace = outer;
                self.write_indent();
                self.write("}");
            }
        }
    }

    fn print_heritage_list(&mut self, list: &[HeritageType]) {
        for (i, heritage) in list.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_heritage(heritage);
        }
    }

    fn print_heritage(&mut self, heritage: &HeritageType) {
        self.print_entity(&heritage.expression);
        self.print_type_arguments(&heritage.type_arguments);
    }

    fn print_entity(&mut self, name: &EntityName) {
        for (i, segment) in name.segments.iter().enumerate() {
            if i > 0 {
                self.write(".");
            }
            self.write(segment);
        }
    }

    // =========================================================================
    // Members and signatures
    // =========================================================================

    fn print_member_block(&mut self, members: &[Member]) {
        if members.is_empty() {
            self.write("{ }");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        for member in members {
            self.write_indent();
            self.print_member(member);
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn print_member(&mut self, member: &Member) {
        match member {
            Member::Property {
                name,
                modifiers,
                optional,
                type_annotation,
            } => {
                self.print_member_modifiers(*modifiers);
                self.print_property_name(name);
                if *optional {
                    self.write("?");
                }
                if let Some(ty) = type_annotation {
                    self.write(": ");
                    self.print_type(ty);
                }
            }
            Member::Method {
                name,
                modifiers,
                optional,
                type_parameters,
                parameters,
                return_type,
            } => {
                self.print_member_modifiers(*modifiers);
                self.print_property_name(name);
                if *optional {
                    self.write("?");
                }
                self.print_signature(type_parameters, parameters, return_type.as_ref());
            }
            Member::CallSignature {
                type_parameters,
                parameters,
                return_type,
            } => self.print_signature(type_parameters, parameters, return_type.as_ref()),
            Member::ConstructSignature {
                type_parameters,
                parameters,
                return_type,
            } => {
                self.write("new ");
                self.print_signature(type_parameters, parameters, return_type.as_ref());
            }
            Member::IndexSignature {
                modifiers,
                parameters,
                type_annotation,
            } => {
                self.print_member_modifiers(*modifiers);
                self.write("[");
                self.print_parameters(parameters);
                self.write("]: ");
                self.print_type(type_annotation);
            }
            Member::Constructor {
                modifiers,
                parameters,
            } => {
                self.print_member_modifiers(*modifiers);
                self.write("constructor(");
                self.print_parameters(parameters);
                self.write(")");
            }
            Member::GetAccessor {
                name,
                modifiers,
                return_type,
            } => {
                self.print_member_modifiers(*modifiers);
                self.write("get ");
                self.print_property_name(name);
                self.write("()");
                if let Some(ty) = return_type {
                    self.write(": ");
                    self.print_type(ty);
                }
            }
            Member::SetAccessor {
                name,
                modifiers,
                parameters,
            } => {
                self.print_member_modifiers(*modifiers);
                self.write("set ");
                self.print_property_name(name);
                self.write("(");
                self.print_parameters(parameters);
                self.write(")");
            }
        }
        self.write(";");
    }

    fn print_member_modifiers(&mut self, modifiers: Modifiers) {
        for keyword in modifiers.keywords() {
            self.write(keyword);
            self.write(" ");
        }
    }

    fn print_property_name(&mut self, name: &PropertyName) {
        match name {
            PropertyName::Identifier { name } => self.write(name),
            PropertyName::StringLiteral { value } => self.write_string_literal(value),
            PropertyName::NumericLiteral { value } => self.write(value),
            PropertyName::Computed { expression } => {
                self.write("[");
                self.print_entity(expression);
                self.write("]");
            }
        }
    }

    /// `<T>(a: A): R`, the return type omitted when absent.
    fn print_signature(
        &mut self,
        type_parameters: &[TypeParameter],
        parameters: &[Parameter],
        return_type: Option<&TypeNode>,
    ) {
        self.print_type_parameters(type_parameters);
        self.write("(");
        self.print_parameters(parameters);
        self.write(")");
        if let Some(ty) = return_type {
            self.write(": ");
            self.print_type(ty);
        }
    }

    fn print_parameters(&mut self, parameters: &[Parameter]) {
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_member_modifiers(param.modifiers);
            if param.rest {
                self.write("...");
            }
            self.write(&param.name);
            if param.optional {
                self.write("?");
            }
            if let Some(ty) = &param.type_annotation {
                self.write(": ");
                self.print_type(ty);
            }
        }
    }

    fn print_type_parameters(&mut self, params: &[TypeParameter]) {
        if params.is_empty() {
            return;
        }
        self.write("<");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_type_parameter(param);
        }
        self.write(">");
    }

    fn print_type_parameter(&mut self, param: &TypeParameter) {
        for keyword in &param.keywords {
            self.write(keyword);
            self.write(" ");
        }
        self.write(&param.name);
        if let Some(constraint) = &param.constraint {
            self.write(" extends ");
            self.print_type(constraint);
        }
        if let Some(default) = &param.default {
            self.write(" = ");
            self.print_type(default);
        }
    }

    fn print_type_arguments(&mut self, arguments: &[TypeNode]) {
        if arguments.is_empty() {
            return;
        }
        self.write("<");
        self.print_type_list(arguments, ", ", Precedence::Lowest);
        self.write(">");
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn print_type(&mut self, ty: &TypeNode) {
        self.print_type_at(ty, Precedence::Lowest);
    }

    fn print_type_list(&mut self, types: &[TypeNode], separator: &str, min: Precedence) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.print_type_at(ty, min);
        }
    }

    /// Print `ty` in a position requiring at least `min`, parenthesizing
    /// anything that binds more loosely.
    fn print_type_at(&mut self, ty: &TypeNode, min: Precedence) {
        let wrap = precedence_of(ty) < min;
        if wrap {
            self.write("(");
        }
        self.print_type_inner(ty);
        if wrap {
            self.write(")");
        }
    }

    fn print_type_inner(&mut self, ty: &TypeNode) {
        match ty {
            TypeNode::Keyword { name } => self.write(name),
            TypeNode::Literal { text } => self.write(text),
            TypeNode::Reference {
                name,
                type_arguments,
            } => {
                self.print_entity(name);
                self.print_type_arguments(type_arguments);
            }
            TypeNode::Array { element } => {
                self.print_type_at(element, Precedence::Postfix);
                self.write("[]");
            }
            TypeNode::Tuple { elements } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_tuple_element(element);
                }
                self.write("]");
            }
            TypeNode::Union { types } => self.print_type_list(types, " | ", Precedence::Intersection),
            TypeNode::Intersection { types } => {
                self.print_type_list(types, " & ", Precedence::Prefix)
            }
            TypeNode::Function {
                type_parameters,
                parameters,
                return_type,
            } => {
                self.print_type_parameters(type_parameters);
                self.write("(");
                self.print_parameters(parameters);
                self.write(") => ");
                self.print_type(return_type);
            }
            TypeNode::Constructor {
                is_abstract,
                type_parameters,
                parameters,
                return_type,
            } => {
                if *is_abstract {
                    self.write("abstract ");
                }
                self.write("new ");
                self.print_type_parameters(type_parameters);
                self.write("(");
                self.print_parameters(parameters);
                self.write(") => ");
                self.print_type(return_type);
            }
            TypeNode::TypeLiteral { members } => self.print_member_block(members),
            TypeNode::TypeQuery {
                name,
                type_arguments,
            } => {
                self.write("typeof ");
                self.print_entity(name);
                self.print_type_arguments(type_arguments);
            }
            TypeNode::TypeOperator { operator, target } => {
                self.write(operator.keyword());
                self.write(" ");
                self.print_type_at(target, Precedence::Prefix);
            }
            TypeNode::IndexedAccess { object, index } => {
                self.print_type_at(object, Precedence::Postfix);
                self.write("[");
                self.print_type(index);
                self.write("]");
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                self.print_type_at(check, Precedence::Union);
                self.write(" extends ");
                self.print_type_at(extends, Precedence::Union);
                self.write(" ? ");
                self.print_type(true_type);
                self.write(" : ");
                self.print_type(false_type);
            }
            TypeNode::Infer { type_parameter } => {
                self.write("infer ");
                self.print_type_parameter(type_parameter);
            }
            TypeNode::Mapped {
                type_parameter,
                name_type,
                readonly,
                optional,
                target,
            } => {
                self.write("{ ");
                if let Some(modifier) = readonly {
                    self.write(modifier.prefix());
                    self.write("readonly ");
                }
                self.write("[");
                self.write(&type_parameter.name);
                self.write(" in ");
                if let Some(constraint) = &type_parameter.constraint {
                    self.print_type(constraint);
                }
                if let Some(name_type) = name_type {
                    self.write(" as ");
                    self.print_type(name_type);
                }
                self.write("]");
                if let Some(modifier) = optional {
                    self.write(mapped_optional(*modifier));
                }
                if let Some(target) = target {
                    self.write(": ");
                    self.print_type(target);
                }
                self.write("; }");
            }
            TypeNode::Import {
                argument,
                qualifier,
                type_arguments,
                is_type_of,
            } => {
                if *is_type_of {
                    self.write("typeof ");
                }
                self.write("import(");
                self.write_string_literal(argument);
                self.write(")");
                if let Some(qualifier) = qualifier {
                    self.write(".");
                    self.print_entity(qualifier);
                }
                self.print_type_arguments(type_arguments);
            }
            TypeNode::Predicate {
                asserts,
                parameter,
                target,
            } => {
                if *asserts {
                    self.write("asserts ");
                }
                self.write(parameter);
                if let Some(target) = target {
                    self.write(" is ");
                    self.print_type(target);
                }
            }
            TypeNode::Parenthesized { inner } => {
                self.write("(");
                self.print_type(inner);
                self.write(")");
            }
            TypeNode::TemplateLiteral { head, spans } => {
                self.write("`");
                self.write(head);
                for span in spans {
                    self.write("${");
                    self.print_type(&span.ty);
                    self.write("}");
                    self.write(&span.literal);
                }
                self.write("`");
            }
            TypeNode::Opaque { tokens } => self.print_tokens(tokens),
        }
    }

    fn print_tuple_element(&mut self, element: &TupleElement) {
        if element.rest {
            self.write("...");
        }
        match &element.name {
            Some(name) => {
                self.write(name);
                if element.optional {
                    self.write("?");
                }
                self.write(": ");
                self.print_type(&element.element);
            }
            None => {
                self.print_type_at(&element.element, Precedence::Postfix);
                if element.optional {
                    self.write("?");
                }
            }
        }
    }
}

fn precedence_of(ty: &TypeNode) -> Precedence {
    match ty {
        TypeNode::Function { .. } | TypeNode::Constructor { .. } | TypeNode::Conditional { .. } => {
            Precedence::Lowest
        }
        TypeNode::Union { types } if types.len() > 1 => Precedence::Union,
        TypeNode::Intersection { types } if types.len() > 1 => Precedence::Intersection,
        TypeNode::TypeOperator { .. } | TypeNode::Infer { .. } | TypeNode::Predicate { .. } => {
            Precedence::Prefix
        }
        TypeNode::Array { .. } | TypeNode::IndexedAccess { .. } => Precedence::Postfix,
        // Opaque text may contain anything.
        TypeNode::Opaque { .. } => Precedence::Lowest,
        _ => Precedence::Primary,
    }
}

fn mapped_optional(modifier: MappedModifier) -> &'static str {
    match modifier {
        MappedModifier::Present => "?",
        MappedModifier::Plus => "+?",
        MappedModifier::Minus => "-?",
    }
}

#[cfg(test)]
#[path = "../tests/printer.rs"]
mod tests;
