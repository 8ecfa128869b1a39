//! # Command Table Macro
//!
//! Generates a module holding a `static` AT command table that a
//! `CommandRegistry` can borrow in place, so a firmware keeps its command
//! table in flash instead of copying it into RAM.
//!
//! ## Macro Input Format
//! ```text
//! mod <module_name>;
//! "<NAME>": [<min_args>, <max_args>] (=> <handler path>)? (, help = "<text>" | , help_fn = <path>)? ;
//! ...
//! ```
//! Handler and help paths must be absolute (`crate::...`), they are used
//! from inside the generated module.
//!
//! ## Compile-time checks
//! Every row is checked against the `at_config` bounds: name length, help
//! length, names containing operator characters, the reserved `+HELP` name,
//! duplicates, `min_args > max_args` and the table capacity. A table that
//! compiles is therefore always accepted by `CommandRegistry::borrowed`.
//!
//! ## Generated API
//! - `COMMANDS: &[CommandDef<'static>]`
//! - `NUM_COMMANDS: usize`
//! - `registry() -> Result<CommandRegistry<'static>, ConfigError>`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    bracketed,
    parse::{Parse, ParseStream},
    parse_macro_input, Ident, LitInt, LitStr, Path, Result, Token,
};

use at_config::{AT_COMMAND_MAX_LEN, HELP_COMMAND, HELP_STRING_MAX_LEN, MAX_NUM_COMMANDS, OPERATOR_CHARS};

/// Parsed macro input: `mod <ident>;` followed by command rows.
struct TableMacroInput {
    mod_ident: Ident,
    rows: Vec<CommandRow>,
}

/// One `"<NAME>": [min, max] => handler, help = "...";` row.
struct CommandRow {
    name: LitStr,
    min_args: LitInt,
    max_args: LitInt,
    handler: Option<Path>,
    help: Option<HelpSpec>,
}

enum HelpSpec {
    Text(LitStr),
    Emitter(Path),
}

impl Parse for TableMacroInput {
    fn parse(input: ParseStream) -> Result<Self> {
        // Expect: `mod <ident>;`
        input.parse::<Token![mod]>()?;
        let mod_ident: Ident = input.parse()?;
        input.parse::<Token![;]>()?;

        let mut rows = Vec::new();
        while !input.is_empty() {
            rows.push(input.parse()?);
        }
        Ok(TableMacroInput { mod_ident, rows })
    }
}

impl Parse for CommandRow {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: LitStr = input.parse()?;
        input.parse::<Token![:]>()?;

        let arity;
        bracketed!(arity in input);
        let min_args: LitInt = arity.parse()?;
        arity.parse::<Token![,]>()?;
        let max_args: LitInt = arity.parse()?;

        let handler = if input.peek(Token![=>]) {
            input.parse::<Token![=>]>()?;
            Some(input.parse::<Path>()?)
        } else {
            None
        };

        let mut help = None;
        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let spec = if key == "help" {
                HelpSpec::Text(input.parse()?)
            } else if key == "help_fn" {
                HelpSpec::Emitter(input.parse()?)
            } else {
                return Err(syn::Error::new(key.span(), "Unexpected identifier, expected 'help' or 'help_fn'"));
            };
            if help.replace(spec).is_some() {
                return Err(syn::Error::new(key.span(), "help given twice"));
            }
        }

        input.parse::<Token![;]>()?;
        Ok(CommandRow { name, min_args, max_args, handler, help })
    }
}

/// Generate the table module, or a compile error naming the offending row.
pub fn define_at_commands_impl(input: TokenStream) -> TokenStream {
    let TableMacroInput { mod_ident, rows } = parse_macro_input!(input as TableMacroInput);

    match expand(mod_ident, &rows) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mod_ident: Ident, rows: &[CommandRow]) -> Result<TokenStream2> {
    if rows.len() > MAX_NUM_COMMANDS {
        return Err(syn::Error::new(
            mod_ident.span(),
            format!("{} commands exceed maximum {}", rows.len(), MAX_NUM_COMMANDS),
        ));
    }

    let mut seen: Vec<String> = Vec::new();
    let mut defs: Vec<TokenStream2> = Vec::new();
    let mut sig_checks: Vec<TokenStream2> = Vec::new();

    for row in rows {
        let name = row.name.value();
        check_name(&row.name, &name, &seen)?;
        seen.push(name);

        let min_args: u16 = row.min_args.base10_parse()?;
        let max_args: u16 = row.max_args.base10_parse()?;
        if min_args > max_args {
            return Err(syn::Error::new(
                row.min_args.span(),
                format!("min args {} exceeds max args {}", min_args, max_args),
            ));
        }

        let name_lit = &row.name;
        let mut def = quote! {
            ::at_core::CommandDef::new(#name_lit).args(#min_args, #max_args)
        };

        match &row.help {
            Some(HelpSpec::Text(text)) => {
                if text.value().len() > HELP_STRING_MAX_LEN {
                    return Err(syn::Error::new(
                        text.span(),
                        format!("help string exceeds maximum length {}", HELP_STRING_MAX_LEN),
                    ));
                }
                def = quote! { #def.help(#text) };
            }
            Some(HelpSpec::Emitter(path)) => {
                sig_checks.push(quote! {
                    const _: fn() = || {
                        let _check: ::at_core::HelpEmitter = #path;
                        let _ = _check;
                    };
                });
                def = quote! { #def.help_fn(#path) };
            }
            None => {}
        }

        if let Some(path) = &row.handler {
            // Compile-time signature check with the error pointing at the path.
            sig_checks.push(quote! {
                const _: fn() = || {
                    let _check: ::at_core::Handler = #path;
                    let _ = _check;
                };
            });
            def = quote! { #def.handler(#path) };
        }

        defs.push(def);
    }

    let num_commands = defs.len();

    Ok(quote! {
        #[allow(non_snake_case, unused_imports)]
        pub mod #mod_ident {
            //! Generated by `define_at_commands!`.

            #( #sig_checks )*

            /// Command table, in declaration order.
            pub static COMMANDS: &[::at_core::CommandDef<'static>] = &[
                #( #defs ),*
            ];

            /// Number of declared commands, `+HELP` excluded.
            pub const NUM_COMMANDS: usize = #num_commands;

            /// A registry borrowing `COMMANDS`.
            pub fn registry() -> ::core::result::Result<::at_core::CommandRegistry<'static>, ::at_core::ConfigError> {
                ::at_core::CommandRegistry::borrowed(COMMANDS)
            }
        }
    })
}

/// Reject names the registry would refuse at runtime.
fn check_name(lit: &LitStr, name: &str, seen: &[String]) -> Result<()> {
    let problem = if name.is_empty() {
        Some("empty command name".to_string())
    } else if name.len() > AT_COMMAND_MAX_LEN {
        Some(format!("command name exceeds maximum length {}", AT_COMMAND_MAX_LEN))
    } else if name.contains(OPERATOR_CHARS) {
        Some("command name contains an operator character".to_string())
    } else if name == HELP_COMMAND {
        Some(format!("{} is generated automatically", HELP_COMMAND))
    } else if seen.iter().any(|s| s == name) {
        Some(format!("duplicate command name {}", name))
    } else {
        None
    };

    match problem {
        Some(msg) => Err(syn::Error::new(lit.span(), msg)),
        None => Ok(()),
    }
}
