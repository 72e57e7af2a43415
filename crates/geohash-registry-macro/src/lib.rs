use std::collections::HashMap;

use alloy_primitives::keccak256;
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{braced, token, Ident, LitStr, Result, Token, Visibility};

use proc_macro_crate::{crate_name, FoundCrate};

/// Geohash symbols, in value order. Must match `geohash_registry::ALPHABET`.
const ALPHABET: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

/// `Name = "path";` or `Name = "path" { children }`
struct CellNode {
    name: Ident,
    path: LitStr,
    children: Vec<CellNode>,
}

struct CellsInput {
    vis: Visibility,
    root: Ident,
    nodes: Vec<CellNode>,
}

impl Parse for CellsInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let vis: Visibility = input.parse()?;
        input.parse::<Token![mod]>()?;
        let root: Ident = input.parse()?;
        let content;
        braced!(content in input);
        let nodes = parse_nodes(&content)?;
        Ok(CellsInput { vis, root, nodes })
    }
}

fn parse_nodes(input: ParseStream) -> Result<Vec<CellNode>> {
    let mut nodes = Vec::new();
    while !input.is_empty() {
        let name: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let path: LitStr = input.parse()?;

        // Parse children or semicolon
        let children = if input.peek(token::Brace) {
            let content;
            braced!(content in input);
            parse_nodes(&content)?
        } else {
            input.parse::<Token![;]>()?;
            Vec::new()
        };
        nodes.push(CellNode {
            name,
            path,
            children,
        });
    }
    Ok(nodes)
}

// =============================================================================
// Validation (runs at macro expansion time)
// =============================================================================

/// Check a literal against the alphabet. The root is never a token, so the
/// empty path is rejected too.
fn validate_path(lit: &LitStr) -> Result<String> {
    let path = lit.value();
    if path.is_empty() {
        return Err(syn::Error::new(
            lit.span(),
            "empty geohash: the root cell is never a token",
        ));
    }
    if let Some((position, symbol)) = path.chars().enumerate().find(|(_, c)| !ALPHABET.contains(*c)) {
        return Err(syn::Error::new(
            lit.span(),
            format!("invalid geohash symbol {symbol:?} at position {position}"),
        ));
    }
    Ok(path)
}

struct FlatCell {
    name: Ident,
    path: String,
    span: Span,
}

/// Flatten the nested input, checking that each child lies inside its parent.
fn flatten_nodes(nodes: &[CellNode], parent: Option<&str>, out: &mut Vec<FlatCell>) -> Result<()> {
    for node in nodes {
        let path = validate_path(&node.path)?;
        if let Some(parent) = parent
            && !(path.len() > parent.len() && path.starts_with(parent))
        {
            return Err(syn::Error::new(
                node.path.span(),
                format!("'{path}' does not lie inside enclosing cell '{parent}'"),
            ));
        }
        out.push(FlatCell {
            name: node.name.clone(),
            path: path.clone(),
            span: node.path.span(),
        });
        flatten_nodes(&node.children, Some(&path), out)?;
    }
    Ok(())
}

fn check_duplicates(flat: &[FlatCell]) -> Result<()> {
    let mut paths: HashMap<&str, &Ident> = HashMap::new();
    let mut names: HashMap<String, &str> = HashMap::new();
    for cell in flat {
        if let Some(existing) = paths.insert(&cell.path, &cell.name) {
            return Err(syn::Error::new(
                cell.span,
                format!("geohash '{}' is already declared as `{}`", cell.path, existing),
            ));
        }
        if let Some(existing) = names.insert(cell.name.to_string(), &cell.path) {
            return Err(syn::Error::new(
                cell.name.span(),
                format!("`{}` is already declared for '{}'", cell.name, existing),
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Crate path resolution
// =============================================================================

fn registry_crate_path() -> TokenStream2 {
    match crate_name("geohash-registry") {
        Ok(FoundCrate::Itself) => {
            quote!(::geohash_registry)
        }
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::geohash_registry),
    }
}

// =============================================================================
// Code generation
// =============================================================================

/// A const `TokenId` expression holding keccak256(path).
fn token_id_expr(path: &str, krate: &TokenStream2) -> TokenStream2 {
    let digest = keccak256(path.as_bytes()).0;
    let bytes = digest.iter();
    quote! {
        #krate::TokenId::from_be_bytes([#(#bytes),*])
    }
}

fn generate_cells(input: &CellsInput, krate: &TokenStream2) -> Result<TokenStream2> {
    let mut flat = Vec::new();
    flatten_nodes(&input.nodes, None, &mut flat)?;
    check_duplicates(&flat)?;

    let count = flat.len();
    let consts = flat.iter().map(|cell| {
        let name = &cell.name;
        let path = &cell.path;
        let id = token_id_expr(path, krate);
        quote! {
            pub const #name: #krate::StaticCell = #krate::StaticCell::new(#path, #id);
        }
    });
    let names = flat.iter().map(|cell| &cell.name);

    let vis = &input.vis;
    let root = &input.root;

    Ok(quote! {
        #[allow(non_snake_case, non_upper_case_globals)]
        #vis mod #root {
            /// Number of declared cells.
            pub const COUNT: usize = #count;

            #(#consts)*

            /// Every declared cell, parents before children.
            pub const ALL: &[#krate::StaticCell] = &[#(#names),*];
        }
    })
}

// =============================================================================
// Entry points
// =============================================================================

/// Token id of a geohash literal, computed at compile time.
///
/// ```ignore
/// const ZERO: TokenId = cell_id!("0");
/// ```
///
/// Invalid symbols (including `a`, `i`, `l`, `o`) and the empty string are
/// compile errors.
#[proc_macro]
pub fn cell_id(input: TokenStream) -> TokenStream {
    let lit = syn::parse_macro_input!(input as LitStr);
    let krate = registry_crate_path();
    match validate_path(&lit) {
        Ok(path) => token_id_expr(&path, &krate).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Declare a module of named cells with precomputed ids.
///
/// ```ignore
/// cells! {
///     pub mod Landmarks {
///         BayArea = "9q" {
///             SanFrancisco = "9q8yy";
///         }
///         Copenhagen = "u3buv";
///     }
/// }
///
/// registry.mint_path(Landmarks::SanFrancisco.path, owner, &Unrestricted)?;
/// assert!(registry.exists(Landmarks::SanFrancisco.id));
/// ```
///
/// Nested cells must lie inside their enclosing cell. Paths and names must be
/// unique within the module.
#[proc_macro]
pub fn cells(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as CellsInput);
    let krate = registry_crate_path();
    match generate_cells(&input, &krate) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
