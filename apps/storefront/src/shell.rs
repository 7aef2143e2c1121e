//! # Terminal Shell
//!
//! Line-oriented front end: reads one command per line, runs it against the
//! session, and prints the resulting view.
//!
//! ## Views
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  > products                      > cart                                 │
//! │  Desserts                        Your Cart (3)                          │
//! │    [1] Waffle with Berries ...     [1] Waffle with Berries  2 x $6.50   │
//! │                                    Subtotal           $13.00            │
//! │  > review                          Discount (HAPPYHOURS) -$2.34         │
//! │  Confirm Your Order                Order Total        $10.66            │
//! │    ...                                                                  │
//! │    Type `order` to place it.     > order                                │
//! │                                  Order Confirmed  #a1b2                 │
//! │                                    ...                                  │
//! │                                    Type `new` to start a new order.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Views go to the writer handed to [`run_shell`]; logs go to stderr.

use std::fmt::Write as _;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use pantry_core::{DiscountApplication, Money, Product};

use crate::commands::cart::{self, CartLineView, CartResponse};
use crate::commands::catalog::{self, CatalogResponse};
use crate::commands::order::{self, ConfirmationResponse, ReviewResponse};
use crate::error::ApiError;
use crate::state::Storefront;

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  products              list the catalog
  product <id>          show one product
  add <id> [qty]        add to cart (default 1)
  set <id> <qty>        set a quantity (0 removes)
  inc <id> | dec <id>   change a quantity by one
  rm <id>               remove a line
  clear                 empty the cart
  cart                  show the cart
  code [text]           type a discount code (empty clears it)
  apply [text]          apply the typed discount code
  review                check the order before placing it
  order                 place the order
  new                   start a new order
  help                  show this help
  quit                  leave the store";

// =============================================================================
// Parsing
// =============================================================================

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Products,
    Product(String),
    Add { product_id: String, quantity: Option<i64> },
    Set { product_id: String, quantity: i64 },
    Increase(String),
    Decrease(String),
    Remove(String),
    Clear,
    Cart,
    Code(String),
    Apply(Option<String>),
    Review,
    Order,
    New,
    Help,
    Quit,
}

/// Parses one input line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, ApiError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("products" | "ls", []) => ShellCommand::Products,
        ("product" | "show", [id]) => ShellCommand::Product(id.to_string()),
        ("add", [id]) => ShellCommand::Add {
            product_id: id.to_string(),
            quantity: None,
        },
        ("add", [id, qty]) => ShellCommand::Add {
            product_id: id.to_string(),
            quantity: Some(parse_quantity(qty)?),
        },
        ("set", [id, qty]) => ShellCommand::Set {
            product_id: id.to_string(),
            quantity: parse_quantity(qty)?,
        },
        ("inc" | "+", [id]) => ShellCommand::Increase(id.to_string()),
        ("dec" | "-", [id]) => ShellCommand::Decrease(id.to_string()),
        ("rm" | "remove", [id]) => ShellCommand::Remove(id.to_string()),
        ("clear", []) => ShellCommand::Clear,
        ("cart", []) => ShellCommand::Cart,
        ("code", rest) => ShellCommand::Code(rest.join(" ")),
        ("apply", []) => ShellCommand::Apply(None),
        ("apply", rest) => ShellCommand::Apply(Some(rest.join(" "))),
        ("review", []) => ShellCommand::Review,
        ("order" | "checkout", []) => ShellCommand::Order,
        ("new", []) => ShellCommand::New,
        ("help" | "?", []) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        (verb, _) => {
            return Err(ApiError::validation(format!(
                "Unknown command or wrong arguments: {} (try `help`)",
                verb
            )))
        }
    };

    Ok(Some(command))
}

fn parse_quantity(text: &str) -> Result<i64, ApiError> {
    text.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Not a quantity: {}", text)))
}

// =============================================================================
// Shell
// =============================================================================

/// What to do after a line has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Runs parsed commands against a session.
pub struct Shell<'a> {
    store: &'a Storefront,
}

impl<'a> Shell<'a> {
    pub fn new(store: &'a Storefront) -> Self {
        Shell { store }
    }

    /// Greeting printed once at start-up.
    pub fn banner(&self) -> String {
        let mut out = format!("Welcome to {}! Type `help` for commands.", self.store.config.store_name);
        if self.store.config.missing_api_key {
            out.push_str("\nNote: no API key is configured; placing orders may be refused.");
        }
        out
    }

    /// Handles one raw input line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Reply::Output(String::new()),
            Err(e) => return Reply::Output(render_error(&e)),
        };

        if command == ShellCommand::Quit {
            return Reply::Quit;
        }

        debug!(?command, "Shell command");
        match self.execute(command).await {
            Ok(view) => Reply::Output(view),
            Err(e) => Reply::Output(render_error(&e)),
        }
    }

    /// Runs one command and renders its view.
    pub async fn execute(&self, command: ShellCommand) -> Result<String, ApiError> {
        let store = self.store;
        let view = match command {
            ShellCommand::Products => render_catalog(&catalog::list_products(&store.catalog).await),
            ShellCommand::Product(id) => {
                render_product(&catalog::get_product(&store.catalog, id).await?)
            }
            ShellCommand::Add {
                product_id,
                quantity,
            } => render_cart(
                &cart::add_to_cart(&store.catalog, &store.cart, product_id, quantity).await?,
            ),
            ShellCommand::Set {
                product_id,
                quantity,
            } => render_cart(&cart::update_cart_item(&store.cart, product_id, quantity)?),
            ShellCommand::Increase(id) => render_cart(&cart::increase_quantity(&store.cart, id)?),
            ShellCommand::Decrease(id) => render_cart(&cart::decrease_quantity(&store.cart, id)?),
            ShellCommand::Remove(id) => render_cart(&cart::remove_from_cart(&store.cart, id)),
            ShellCommand::Clear => render_cart(&cart::clear_cart(&store.cart)),
            ShellCommand::Cart => render_cart(&cart::get_cart(&store.cart)),
            ShellCommand::Code(text) => render_cart(&cart::set_discount_input(&store.cart, text)),
            ShellCommand::Apply(text) => {
                if let Some(text) = text {
                    cart::set_discount_input(&store.cart, text);
                }
                let response = cart::apply_discount_code(&store.cart);
                let headline = match &response.outcome {
                    DiscountApplication::Applied { code, .. } => format!("Discount {} applied.", code),
                    DiscountApplication::Cleared => "Discount removed.".to_string(),
                    DiscountApplication::Rejected { .. } => "Discount not applied.".to_string(),
                };
                format!("{}\n{}", headline, render_cart(&response.cart))
            }
            ShellCommand::Review => render_review(&order::review_order(&store.cart)?),
            ShellCommand::Order => {
                render_confirmation(&order::place_order(&store.cart, &store.orders).await?)
            }
            ShellCommand::New => {
                let cart = order::start_new_order(&store.cart, &store.orders);
                format!("Started a new order.\n{}", render_cart(&cart))
            }
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => String::new(),
        };
        Ok(view)
    }
}

/// Reads commands from `input` until EOF or `quit`, writing views to `output`.
pub async fn run_shell<R, W>(store: &Storefront, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let shell = Shell::new(store);
    output
        .write_all(format!("{}\n{}", shell.banner(), PROMPT).as_bytes())
        .await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match shell.handle_line(&line).await {
            Reply::Quit => break,
            Reply::Output(view) => {
                if !view.is_empty() {
                    output.write_all(view.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                output.write_all(PROMPT.as_bytes()).await?;
                output.flush().await?;
            }
        }
    }

    if store.orders.is_submitting() {
        warn!("Shell closed while an order was still being placed");
    }
    output.write_all(b"Goodbye!\n").await?;
    output.flush().await
}

// =============================================================================
// Rendering
// =============================================================================

fn render_error(err: &ApiError) -> String {
    format!("! {}", err.message)
}

pub fn render_catalog(response: &CatalogResponse) -> String {
    let mut out = String::from("Desserts");
    if response.offline {
        out.push_str(" (offline: showing saved catalog)");
    }
    if response.products.is_empty() {
        out.push_str("\n  No products available right now.");
    }
    for p in &response.products {
        let _ = write!(
            out,
            "\n  [{:>2}] {:<28} {:<14} {:>8}",
            p.id,
            p.name,
            p.category,
            p.price().to_string()
        );
    }
    out
}

pub fn render_product(product: &Product) -> String {
    format!(
        "{}\n  Category: {}\n  Price:    {}\n  Image:    {}",
        product.name,
        product.category,
        product.price(),
        product.image.desktop
    )
}

pub fn render_cart(response: &CartResponse) -> String {
    if response.is_empty() {
        let mut out = String::from("Your cart is empty. Add a dessert with `add <id>`.");
        render_discount_field(&mut out, response);
        return out;
    }

    let mut out = format!("Your Cart ({})", response.totals.item_count);
    for line in &response.lines {
        render_line(&mut out, line);
    }
    render_totals(
        &mut out,
        response.totals.subtotal,
        response.discount_code.as_deref(),
        response.totals.discount_amount,
        response.totals.final_total,
    );
    render_discount_field(&mut out, response);
    out
}

pub fn render_review(response: &ReviewResponse) -> String {
    let mut out = String::from("Confirm Your Order");
    for line in &response.cart.lines {
        render_line(&mut out, line);
    }
    render_totals(
        &mut out,
        response.cart.totals.subtotal,
        response.order.coupon_code.as_deref(),
        response.cart.totals.discount_amount,
        response.cart.totals.final_total,
    );
    out.push_str("\nType `order` to place it.");
    out
}

pub fn render_confirmation(response: &ConfirmationResponse) -> String {
    let mut out = format!("Order Confirmed  #{}\nWe hope you enjoy your food!", response.order_id);
    for line in &response.lines {
        let _ = write!(
            out,
            "\n  {:<28} {:>3} x {:>7} {:>9}",
            line.product.name,
            line.quantity,
            line.product.price().to_string(),
            line.line_total.to_string()
        );
    }
    render_totals(
        &mut out,
        response.order_total,
        response.coupon_code.as_deref(),
        response.discount_amount,
        response.final_total,
    );
    out.push_str("\nType `new` to start a new order.");
    out
}

fn render_line(out: &mut String, line: &CartLineView) {
    let marker = if line.exceeds_limit { " (over limit)" } else { "" };
    let _ = write!(
        out,
        "\n  [{:>2}] {:<28} {:>3} x {:>7} {:>9}{}",
        line.product.id,
        line.product.name,
        line.quantity,
        line.product.price().to_string(),
        line.line_total.to_string(),
        marker
    );
}

fn render_totals(out: &mut String, subtotal: Money, code: Option<&str>, discount: Money, total: Money) {
    let _ = write!(out, "\n  {:<40} {:>9}", "Subtotal", subtotal.to_string());
    if discount.is_positive() {
        let label = format!("Discount ({})", code.unwrap_or_default());
        let _ = write!(out, "\n  {:<40} {:>9}", label, format!("-{}", discount));
    }
    let _ = write!(out, "\n  {:<40} {:>9}", "Order Total", total.to_string());
}

fn render_discount_field(out: &mut String, response: &CartResponse) {
    if !response.discount_input.is_empty() {
        let _ = write!(out, "\n  Code: {}", response.discount_input);
    }
    if let Some(error) = &response.discount_error {
        let _ = write!(out, "\n  ! {}", error);
    }
}
