//! Mini-cart fragment extraction.

use scraper::{Html, Selector};

/// Class of the region holding the mini-cart markup in the rendered cart.
pub const MINI_CART_CONTENT: &str = ".mini-cart-content";

/// Inner HTML of the first mini-cart region in `html`, if there is one.
pub fn mini_cart_content(html: &str) -> Option<String> {
    let selector = Selector::parse(MINI_CART_CONTENT).ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .next()
        .map(|region| region.inner_html())
}
