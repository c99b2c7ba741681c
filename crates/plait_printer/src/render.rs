//! Node rendering.
//!
//! Every node knows how to write itself to a [`Writer`]. Separators that
//! only matter for readability go through `space`/`newline`, which compact
//! mode ignores; token text that came from source goes through
//! `write_mapped` so source maps can point back at it.

use crate::writer::Writer;
use plait_ast::node::*;

pub trait Render {
    fn render(&self, w: &mut Writer);
}

// ============================================================================
// Statements
// ============================================================================

impl Render for Program {
    fn render(&self, w: &mut Writer) {
        render_statement_list(&self.statements, w);
    }
}

/// Pretty mode puts each statement on its own line. Compact mode drops
/// comments.
fn render_statement_list(statements: &[Statement], w: &mut Writer) {
    for statement in statements {
        if statement.is_comment() && !w.is_pretty() {
            continue;
        }
        w.newline();
        statement.render(w);
    }
}

fn terminate(w: &mut Writer) {
    if w.emits_terminators() {
        w.write(";");
    }
}

impl Render for Statement {
    fn render(&self, w: &mut Writer) {
        match self {
            Statement::Variable(decl) => {
                decl.render(w);
                terminate(w);
            }
            Statement::Function(func) => {
                w.write_mapped("function", func.span.start, None);
                w.space();
                func.name.render(w);
                render_function_rest(&func.params, &func.body, w);
            }
            Statement::Return(ret) => {
                w.write_mapped("return", ret.span.start, None);
                if let Some(value) = &ret.value {
                    w.space();
                    value.render(w);
                }
                terminate(w);
            }
            Statement::If(stmt) => {
                w.write_mapped("if", stmt.span.start, None);
                w.space();
                w.write("(");
                stmt.condition.render(w);
                w.write(")");
                render_body(&stmt.consequence, w);
                if let Some(alternative) = &stmt.alternative {
                    if matches!(stmt.consequence.as_ref(), Statement::Block(_)) {
                        w.space();
                    } else {
                        w.newline();
                    }
                    w.write("else");
                    if matches!(alternative.as_ref(), Statement::If(_)) {
                        w.space();
                        alternative.render(w);
                    } else {
                        render_body(alternative, w);
                    }
                }
            }
            Statement::While(stmt) => {
                w.write_mapped("while", stmt.span.start, None);
                w.space();
                w.write("(");
                stmt.condition.render(w);
                w.write(")");
                render_body(&stmt.body, w);
            }
            Statement::For(stmt) => {
                w.write_mapped("for", stmt.span.start, None);
                w.space();
                w.write("(");
                match &stmt.init {
                    Some(ForInit::Variable(decl)) => decl.render(w),
                    Some(ForInit::Expression(expr)) => expr.render(w),
                    None => {}
                }
                w.write(";");
                if let Some(test) = &stmt.test {
                    w.space();
                    test.render(w);
                }
                w.write(";");
                if let Some(update) = &stmt.update {
                    w.space();
                    update.render(w);
                }
                w.write(")");
                render_body(&stmt.body, w);
            }
            Statement::Block(block) => block.render(w),
            Statement::Break(span) => {
                w.write_mapped("break", span.start, None);
                terminate(w);
            }
            Statement::Continue(span) => {
                w.write_mapped("continue", span.start, None);
                terminate(w);
            }
            Statement::Expression(stmt) => {
                // A leading `{` or `function` would start a block or a
                // declaration instead.
                let ambiguous = matches!(
                    stmt.expression.leftmost(),
                    Expression::Object(_) | Expression::Function(_)
                );
                if ambiguous {
                    w.write("(");
                    stmt.expression.render(w);
                    w.write(")");
                } else {
                    stmt.expression.render(w);
                }
                terminate(w);
            }
            Statement::Empty(span) => w.write_mapped(";", span.start, None),
            Statement::Comment(comment) => w.write(&comment.text),
        }
    }
}

/// The body of `if`, `else`, `while` and `for`. A non-block body goes on
/// its own indented line in pretty mode.
fn render_body(body: &Statement, w: &mut Writer) {
    if matches!(body, Statement::Block(_)) {
        w.space();
        body.render(w);
    } else {
        w.indent();
        w.newline();
        body.render(w);
        w.dedent();
    }
}

impl Render for VariableDeclaration {
    fn render(&self, w: &mut Writer) {
        w.write_mapped(self.kind.keyword(), self.span.start, None);
        w.space();
        for (i, declarator) in self.declarators.iter().enumerate() {
            if i > 0 {
                w.write(",");
                w.space();
            }
            declarator.name.render(w);
            if let Some(init) = &declarator.init {
                w.space();
                w.write("=");
                w.space();
                init.render(w);
            }
        }
    }
}

impl Render for Block {
    fn render(&self, w: &mut Writer) {
        w.write_mapped("{", self.span.start, None);
        let rendered = self
            .statements
            .iter()
            .any(|statement| w.is_pretty() || !statement.is_comment());
        if rendered {
            w.indent();
            render_statement_list(&self.statements, w);
            w.dedent();
            w.newline();
        }
        w.write("}");
    }
}

/// `(params) { body }`, shared by declarations and literals.
fn render_function_rest(params: &[Identifier], body: &Block, w: &mut Writer) {
    w.write("(");
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            w.write(",");
            w.space();
        }
        param.render(w);
    }
    w.write(")");
    w.space();
    body.render(w);
}

// ============================================================================
// Expressions
// ============================================================================

impl Render for Identifier {
    fn render(&self, w: &mut Writer) {
        w.write_mapped(&self.name, self.span.start, Some(&self.name));
    }
}

impl Render for Expression {
    fn render(&self, w: &mut Writer) {
        match self {
            Expression::Identifier(id) => id.render(w),
            Expression::Integer(lit) => w.write_mapped(&lit.raw, lit.span.start, None),
            Expression::Float(lit) => w.write_mapped(&lit.raw, lit.span.start, None),
            Expression::String(lit) => {
                let text = match &lit.raw {
                    Some(raw) => raw.clone(),
                    None => quote_string(&lit.value, lit.quote.char()),
                };
                w.write_mapped(&text, lit.span.start, None);
            }
            Expression::Template(lit) => {
                let text = format!("`{}`", lit.value.replace('`', "\\`"));
                w.write_mapped(&text, lit.span.start, None);
            }
            Expression::Boolean(lit) => {
                let text = if lit.value { "true" } else { "false" };
                w.write_mapped(text, lit.span.start, None);
            }
            Expression::Null(span) => w.write_mapped("null", span.start, None),
            Expression::Array(array) => {
                w.write_mapped("[", array.span.start, None);
                render_list(&array.elements, w);
                w.write("]");
            }
            Expression::Object(object) => render_object(object, w),
            Expression::Function(func) => {
                w.write_mapped("function", func.span.start, None);
                if let Some(name) = &func.name {
                    w.space();
                    name.render(w);
                }
                render_function_rest(&func.params, &func.body, w);
            }
            Expression::Prefix(expr) => {
                render_operator(&expr.operator, w);
                if expr.operator.is_word() {
                    w.space();
                }
                render_operand(&expr.operand, binding(&expr.operand) < PREFIX, w);
            }
            Expression::Binary(expr) => {
                // An operator of unknown strength wraps every looser-than-prefix operand.
                let level = expr
                    .operator
                    .kind
                    .binary_level()
                    .map_or(UNKNOWN_BINARY_PARENT, |level| BINARY_BASE + level);
                render_operand(&expr.left, binding(&expr.left) < level, w);
                w.space();
                render_operator(&expr.operator, w);
                w.space();
                render_operand(&expr.right, binding(&expr.right) <= level, w);
            }
            Expression::Postfix(expr) => {
                render_operand(&expr.operand, binding(&expr.operand) < POSTFIX, w);
                render_operator(&expr.operator, w);
            }
            Expression::Grouped(group) => {
                w.write_mapped("(", group.span.start, None);
                group.expression.render(w);
                w.write(")");
            }
            Expression::Call(call) => {
                render_operand(&call.callee, binding(&call.callee) < ACCESS, w);
                w.write("(");
                render_list(&call.arguments, w);
                w.write(")");
            }
            Expression::Member(member) => {
                render_operand(&member.object, binding(&member.object) < ACCESS, w);
                w.write(".");
                member.property.render(w);
            }
            Expression::Index(index) => {
                render_operand(&index.object, binding(&index.object) < ACCESS, w);
                w.write("[");
                index.index.render(w);
                w.write("]");
            }
            Expression::Assign(assign) => {
                render_operand(&assign.target, binding(&assign.target) < ACCESS, w);
                w.space();
                render_operator(&assign.operator, w);
                w.space();
                assign.value.render(w);
            }
            Expression::Conditional(cond) => {
                render_operand(&cond.test, binding(&cond.test) <= CONDITIONAL, w);
                w.space();
                w.write("?");
                w.space();
                cond.consequence.render(w);
                w.space();
                w.write(":");
                w.space();
                cond.alternative.render(w);
            }
        }
    }
}

// Binding of each expression form, loosest first. Parsed trees keep their
// parentheses as `Grouped` nodes; these levels only matter for trees built
// by hand, where a looser child must be wrapped to keep its grouping.
const ASSIGN: u8 = 1;
const CONDITIONAL: u8 = 2;
/// A binary operator without a built-in level, e.g. one a plugin
/// registered, seen as an operand.
const UNKNOWN_BINARY: u8 = 3;
/// Built-in binary operators span `BINARY_BASE + 1..=BINARY_BASE + 6`.
const BINARY_BASE: u8 = 3;
const UNKNOWN_BINARY_PARENT: u8 = 10;
const PREFIX: u8 = 11;
const POSTFIX: u8 = 12;
const ACCESS: u8 = 13;
const PRIMARY: u8 = 14;

fn binding(expr: &Expression) -> u8 {
    match expr {
        Expression::Assign(_) => ASSIGN,
        Expression::Conditional(_) => CONDITIONAL,
        Expression::Binary(b) => b
            .operator
            .kind
            .binary_level()
            .map_or(UNKNOWN_BINARY, |level| BINARY_BASE + level),
        Expression::Prefix(_) => PREFIX,
        Expression::Postfix(_) => POSTFIX,
        Expression::Call(_) | Expression::Member(_) | Expression::Index(_) => ACCESS,
        _ => PRIMARY,
    }
}

fn render_operand(operand: &Expression, wrap: bool, w: &mut Writer) {
    if wrap {
        w.write("(");
        operand.render(w);
        w.write(")");
    } else {
        operand.render(w);
    }
}

fn render_operator(operator: &Operator, w: &mut Writer) {
    w.write_mapped(&operator.text, operator.span.start, None);
}

fn render_list(items: &[Expression], w: &mut Writer) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.write(",");
            w.space();
        }
        item.render(w);
    }
}

/// Properties are written in stored order, one per line in pretty mode.
fn render_object(object: &ObjectLiteral, w: &mut Writer) {
    w.write_mapped("{", object.span.start, None);
    if object.properties.is_empty() {
        w.write("}");
        return;
    }
    w.indent();
    for (i, property) in object.properties.iter().enumerate() {
        if i > 0 {
            w.write(",");
        }
        w.newline();
        property.render(w);
    }
    w.dedent();
    w.newline();
    w.write("}");
}

impl Render for Property {
    fn render(&self, w: &mut Writer) {
        if self.shorthand {
            self.key.render(w);
            return;
        }
        if self.computed {
            w.write("[");
            self.key.render(w);
            w.write("]");
        } else {
            self.key.render(w);
        }
        w.write(":");
        w.space();
        self.value.render(w);
    }
}

/// Quote and escape a string value.
pub fn quote_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
