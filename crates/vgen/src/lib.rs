//! vgen REPL and command helpers.
//!
//! The REPL compiles one rule per line against a current parameter:
//!
//! - Rule text prints the Go expression (or the AST with `/ast`)
//! - `/type <T>` and `/param <name>` change the parameter
//! - `/decls` lists the loaded validators
//! - Meta-commands: `/help`, `/quit`

pub mod config;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use owo_colors::OwoColorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use vgen_kernel::ast::sexpr::format_node;
use vgen_kernel::{Compiler, Registry};
use vgen_types::{Param, SemType, parse_type};

/// REPL state: the compiler plus the parameter rules are bound to.
pub struct Repl {
    compiler: Compiler,
    param: Param,
    show_ast: bool,
    done: bool,
}

impl Repl {
    /// Start with a `string` parameter named `x`.
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            param: Param::new("x", SemType::string()),
            show_ast: false,
            done: false,
        }
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    /// Set once `/quit` has been entered.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Process a single line of input.
    ///
    /// Compile errors come back as `Err` carrying the rendered report.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();

        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }
        if trimmed.is_empty() {
            return Ok(None);
        }

        let result = if self.show_ast {
            self.compiler.parse(trimmed).map(|node| format_node(&node))
        } else {
            self.compiler.compile(trimmed, &self.param)
        };
        match result {
            Ok(output) => Ok(Some(output)),
            Err(err) => Err(anyhow!(err.report(trimmed).trim_end().to_string())),
        }
    }

    fn handle_meta_command(&mut self, cmd: &str) -> Result<Option<String>> {
        let (command, rest) = cmd
            .split_once(char::is_whitespace)
            .map_or((cmd, ""), |(command, rest)| (command, rest.trim()));

        match command {
            "/quit" | "/q" | "/exit" => {
                self.done = true;
                Ok(None)
            }
            "/help" | "/h" | "/?" => Ok(Some(HELP_TEXT.to_string())),
            "/ast" => {
                self.show_ast = !self.show_ast;
                Ok(Some(format!("AST mode: {}", if self.show_ast { "ON" } else { "OFF" })))
            }
            "/type" => {
                if !rest.is_empty() {
                    let ty = parse_type(rest).with_context(|| format!("bad type `{rest}`"))?;
                    self.param.ty = ty;
                }
                Ok(Some(self.describe_param()))
            }
            "/param" => {
                if !rest.is_empty() {
                    if !is_identifier(rest) {
                        return Err(anyhow!("`{rest}` is not a parameter name"));
                    }
                    self.param.name = rest.to_string();
                }
                Ok(Some(self.describe_param()))
            }
            "/decls" => Ok(Some(decls_table(self.compiler.registry()))),
            _ => Ok(Some(format!(
                "Unknown command: {}\nType /help for available commands.",
                command
            ))),
        }
    }

    fn describe_param(&self) -> String {
        format!("param: {} {}", self.param.name, self.param.ty)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// One line per declaration, in registry order.
pub fn decls_table(registry: &Registry) -> String {
    let mut out = String::new();
    for d in registry.iter() {
        let mut name = d.qualified_name();
        if d.is_generic {
            name.push_str("[T]");
        }
        out.push_str(&format!(
            "{:<8} {:<16} type={:<16} args={}\n",
            d.alias,
            name,
            d.allowed_types.to_string(),
            d.arg_count.to_string()
        ));
    }
    out.trim_end().to_string()
}

/// The registry as a JSON array of descriptors.
pub fn decls_json(registry: &Registry) -> Result<String> {
    let descriptors: Vec<_> = registry.iter().map(Arc::as_ref).collect();
    serde_json::to_string_pretty(&descriptors).context("serializing declarations")
}

const HELP_TEXT: &str = r#"vgen REPL

Commands:
  /help, /h, /?     Show this help
  /quit, /q, /exit  Exit the REPL
  /type <T>         Set the parameter type (Go syntax, `type N <T>` for named)
  /param <name>     Set the parameter name
  /ast              Toggle AST display mode
  /decls            List loaded validators

Rules:
  nonzero           Validator with no arguments
  len(0, 20)        Validator with arguments
  gt(0).msg("x")    Custom error message
  !a   a && b   a || b   (a)
  _                 Delegate to the parameter's own Schema()

Examples:
  /type []string
  len(1, 10).msg("bad length")
  /type type usersvc.User struct{Name string}
  _
"#;

/// Run the REPL.
pub fn run(compiler: Compiler) -> Result<()> {
    println!("{} v{}", "vgen".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.\n");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = config::data_dir().map(|p| p.join("history.txt"));
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let mut repl = Repl::new(compiler);

    while !repl.is_done() {
        let prompt = format!("vgen({})> ", repl.param().ty);

        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repl() -> Repl {
        Repl::new(Compiler::builtin().expect("builtin declarations load"))
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("name"));
        assert!(is_identifier("_id2"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn quit_sets_done() {
        let mut repl = repl();
        assert!(!repl.is_done());
        assert_eq!(repl.process_line("/q").unwrap(), None);
        assert!(repl.is_done());
    }

    #[test]
    fn table_lists_every_declaration() {
        let registry = Registry::builtin().expect("builtin declarations load");
        let table = decls_table(&registry);
        assert_eq!(table.lines().count(), registry.len());
        assert!(table.lines().next().unwrap().starts_with("nonzero  v.Nonzero[T]"));
        assert!(table.contains("type=string|bytes"));
    }
}
