//! Terminal rendering for command results.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use rust_decimal::Decimal;

use bazaar_core::{CartLine, Product, WishlistEntry};
use bazaar_storefront::listing::ProductPage;
use bazaar_storefront::models::User;

/// Print `message` to stderr and exit with status 1.
pub fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1)
}

pub fn line(message: &str) {
    println!("{message}");
}

fn money(amount: Decimal) -> String {
    format!("${amount:.2}")
}

fn product_row(product: &Product) -> String {
    format!(
        "#{:<4} {:>9}  {:.1}/5 ({:>3})  {}  [{}]",
        product.id,
        product.price.to_string(),
        product.rating.rate,
        product.rating.count,
        product.title,
        product.category
    )
}

pub fn page(page: &ProductPage<'_>) {
    if page.items.is_empty() {
        println!("No products match your filters.");
    }
    for product in &page.items {
        println!("{}", product_row(product));
    }
    if page.total_pages > 0 {
        println!(
            "\nPage {} of {} ({} products)",
            page.page, page.total_pages, page.total_items
        );
    }
}

pub fn product(product: &Product) {
    println!("{}", product.title);
    println!("{} | {}", product.price, product.category);
    println!(
        "Rated {:.1}/5 by {} customers",
        product.rating.rate, product.rating.count
    );
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    if !product.image.is_empty() {
        println!("\n{}", product.image);
    }
}

pub fn categories(categories: &[String]) {
    for category in categories {
        println!("{category}");
    }
}

pub fn cart(lines: &[CartLine], total: Decimal) {
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for cart_line in lines {
        println!(
            "#{:<4} {} x {} = {}  {}",
            cart_line.id(),
            cart_line.quantity,
            cart_line.product.price,
            money(cart_line.line_total()),
            cart_line.product.title
        );
    }
    println!("\nTotal: {}", money(total));
}

pub fn wishlist(entries: &[WishlistEntry]) {
    if entries.is_empty() {
        println!("Your wishlist is empty.");
    }
    for entry in entries {
        println!("{}", product_row(&entry.product));
    }
}

pub fn user(user: Option<&User>) {
    match user {
        Some(user) => println!("{} <{}> (id {})", user.username, user.email, user.id),
        None => println!("Not signed in."),
    }
}

pub fn checkout(user: &User, lines: &[CartLine], total: Decimal, item_count: u32) {
    println!("Checkout for {} <{}>\n", user.username, user.email);
    cart(lines, total);
    println!("{item_count} item(s)");
}
