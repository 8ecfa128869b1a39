extern crate proc_macro;

mod commandsgen;

use proc_macro::TokenStream;
use commandsgen::define_at_commands_impl;

/// Declares a static, borrowed AT command table checked at compile time.
///
/// ```ignore
/// define_at_commands! {
///     mod commands;
///     "+CFG":  [1, 3] => crate::handlers::cfg, help = "Configuration.";
///     "+VER":  [0, 0] => crate::handlers::ver, help_fn = crate::handlers::ver_help;
///     "+TODO": [0, 1];
/// }
/// ```
#[proc_macro]
pub fn define_at_commands(input: TokenStream) -> TokenStream {
    define_at_commands_impl(input)
}
