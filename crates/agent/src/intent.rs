use rust_decimal::Decimal;
use serde::Serialize;

use shopsense_core::behavior::BehaviorSnapshot;
use shopsense_core::catalog::Catalog;
use shopsense_core::config::AssistantConfig;
use shopsense_core::domain::cart::CartSnapshot;
use shopsense_core::domain::product::format_price;
use shopsense_core::recommendations::RecommendationScorer;

pub const PRICED_CATEGORY: &str = "electronics";

const SEARCH_REPLY: &str = "I'll help you search for products. What are you looking for?";
const BUDGET_REPLY: &str =
    "I can help you find products within your budget. What's your price range?";
const COMPARE_REPLY: &str =
    "I can help you compare products. Which items would you like to compare?";
const RECOMMEND_EMPTY_REPLY: &str =
    "I'd be happy to recommend products! Could you tell me what category you're interested in?";
const FALLBACK_REPLY: &str = "I'm here to help you find the perfect products! You can ask me for recommendations, search for specific items, compare products, or get help with your cart.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    CategoryPrice,
    Recommend,
    Search,
    Budget,
    Compare,
    Cart,
    Fallback,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryPrice => "category_price",
            Self::Recommend => "recommend",
            Self::Search => "search",
            Self::Budget => "budget",
            Self::Compare => "compare",
            Self::Cart => "cart",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    CategoryPrice { category: &'static str, max_price: Decimal },
    Recommend,
    /// Carries the raw message, which is what gets recorded as the search.
    Search { query: String },
    Budget,
    Compare,
    Cart,
    Fallback,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::CategoryPrice { .. } => IntentKind::CategoryPrice,
            Self::Recommend => IntentKind::Recommend,
            Self::Search { .. } => IntentKind::Search,
            Self::Budget => IntentKind::Budget,
            Self::Compare => IntentKind::Compare,
            Self::Cart => IntentKind::Cart,
            Self::Fallback => IntentKind::Fallback,
        }
    }
}

/// `(raw message, lower-cased message)`
type Matcher = fn(&str, &str) -> Option<Intent>;

/// Evaluated top to bottom; the first matcher returning an intent wins.
const INTENT_RULES: &[(IntentKind, Matcher)] = &[
    (IntentKind::CategoryPrice, match_category_price),
    (IntentKind::Recommend, match_recommend),
    (IntentKind::Search, match_search),
    (IntentKind::Budget, match_budget),
    (IntentKind::Compare, match_compare),
    (IntentKind::Cart, match_cart),
];

pub fn rule_order() -> impl Iterator<Item = IntentKind> {
    INTENT_RULES.iter().map(|(kind, _)| *kind).chain(std::iter::once(IntentKind::Fallback))
}

/// Everything a reply may depend on, captured before routing.
pub struct RouteContext<'a> {
    pub catalog: &'a Catalog,
    pub behavior: &'a BehaviorSnapshot,
    /// Only fetched for cart questions; `None` reads as an empty cart.
    pub cart: Option<&'a CartSnapshot>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutedReply {
    pub intent: Intent,
    pub reply: String,
    pub search_to_record: Option<String>,
}

#[derive(Clone, Debug)]
pub struct IntentRouter {
    scorer: RecommendationScorer,
    recommendation_count: usize,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new(
            RecommendationScorer::new(),
            AssistantConfig::default().chat_recommendation_count,
        )
    }
}

impl IntentRouter {
    pub fn new(scorer: RecommendationScorer, recommendation_count: usize) -> Self {
        Self { scorer, recommendation_count }
    }

    pub fn classify(&self, message: &str) -> Intent {
        classify(message)
    }

    /// Builds the reply for an already classified message. Never touches state;
    /// the search side effect is handed back in `search_to_record`.
    pub fn respond(&self, intent: Intent, context: &RouteContext<'_>) -> RoutedReply {
        let reply = match &intent {
            Intent::CategoryPrice { category, max_price } => {
                category_price_reply(context.catalog, category, *max_price)
            }
            Intent::Recommend => {
                let names = self
                    .scorer
                    .recommend(context.catalog, context.behavior, self.recommendation_count)
                    .into_iter()
                    .map(|product| product.name)
                    .collect::<Vec<_>>();
                if names.is_empty() {
                    RECOMMEND_EMPTY_REPLY.to_string()
                } else {
                    format!(
                        "Based on your preferences, I recommend: {}. Would you like to see details for any of these?",
                        names.join(", ")
                    )
                }
            }
            Intent::Search { .. } => SEARCH_REPLY.to_string(),
            Intent::Budget => BUDGET_REPLY.to_string(),
            Intent::Compare => COMPARE_REPLY.to_string(),
            Intent::Cart => {
                let items = context.cart.map(CartSnapshot::total_items).unwrap_or(0);
                format!(
                    "You have {items} items in your cart. Would you like to proceed to checkout or continue shopping?"
                )
            }
            Intent::Fallback => FALLBACK_REPLY.to_string(),
        };

        let search_to_record = match &intent {
            Intent::Search { query } => Some(query.clone()),
            _ => None,
        };

        RoutedReply { intent, reply, search_to_record }
    }

    pub fn route(&self, message: &str, context: &RouteContext<'_>) -> RoutedReply {
        self.respond(self.classify(message), context)
    }
}

pub fn classify(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    INTENT_RULES
        .iter()
        .find_map(|(_, matcher)| matcher(message, &lowered))
        .unwrap_or(Intent::Fallback)
}

fn category_price_reply(catalog: &Catalog, category: &str, max_price: Decimal) -> String {
    let matches = catalog.in_category_up_to(category, max_price);
    if matches.is_empty() {
        return format!(
            "Sorry, I couldn't find any {category} under ${max_price}. Try increasing your budget or check our other categories."
        );
    }

    let lines = matches
        .iter()
        .map(|product| {
            format!("• {} - ${} ({})", product.name, format_price(product.price), product.brand)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Here are {category} under ${max_price}:\n\n{lines}\n\nTap any product name to view details!")
}

fn match_category_price(raw: &str, lowered: &str) -> Option<Intent> {
    let has_bound = lowered.contains("under") || lowered.contains('<');
    if !lowered.contains(PRICED_CATEGORY) || !has_bound || !lowered.contains('$') {
        return None;
    }

    let max_price = first_dollar_amount(raw)?;
    Some(Intent::CategoryPrice { category: PRICED_CATEGORY, max_price })
}

fn match_recommend(_raw: &str, lowered: &str) -> Option<Intent> {
    contains_any(lowered, &["recommend", "suggest"]).then_some(Intent::Recommend)
}

fn match_search(raw: &str, lowered: &str) -> Option<Intent> {
    contains_any(lowered, &["search", "find"]).then(|| Intent::Search { query: raw.to_string() })
}

fn match_budget(_raw: &str, lowered: &str) -> Option<Intent> {
    contains_any(lowered, &["price", "budget"]).then_some(Intent::Budget)
}

fn match_compare(_raw: &str, lowered: &str) -> Option<Intent> {
    lowered.contains("compare").then_some(Intent::Compare)
}

fn match_cart(_raw: &str, lowered: &str) -> Option<Intent> {
    contains_any(lowered, &["cart", "checkout"]).then_some(Intent::Cart)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// First `$` immediately followed by digits, read as a whole-dollar amount.
/// Cents after a decimal point are ignored. Amounts too large to represent
/// do not match.
fn first_dollar_amount(text: &str) -> Option<Decimal> {
    text.match_indices('$').find_map(|(index, _)| {
        let digits = text[index + 1..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>();
        if digits.is_empty() {
            return None;
        }
        Some(digits.parse::<Decimal>().ok().map(|amount| amount.normalize()))
    })?
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use shopsense_core::behavior::BehaviorStore;
    use shopsense_core::catalog::Catalog;
    use shopsense_core::domain::cart::{CartLine, CartSnapshot};
    use shopsense_core::domain::product::{Product, ProductId};

    use super::{
        classify, first_dollar_amount, rule_order, Intent, IntentKind, IntentRouter, RouteContext,
    };

    fn electronics(id: &str, name: &str, cents: i64, brand: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            category: "Electronics".to_string(),
            brand: brand.to_string(),
            price: Decimal::new(cents, 2),
            rating: 4.0,
            review_count: 10,
            tags: Vec::new(),
            in_stock: true,
        }
    }

    fn route(message: &str, catalog: &Catalog) -> super::RoutedReply {
        let behavior = BehaviorStore::new().snapshot();
        let context = RouteContext { catalog, behavior: &behavior, cart: None };
        IntentRouter::default().route(message, &context)
    }

    #[test]
    fn rules_are_evaluated_in_fixed_order() {
        let order = rule_order().collect::<Vec<_>>();

        assert_eq!(
            order,
            vec![
                IntentKind::CategoryPrice,
                IntentKind::Recommend,
                IntentKind::Search,
                IntentKind::Budget,
                IntentKind::Compare,
                IntentKind::Cart,
                IntentKind::Fallback,
            ]
        );
    }

    #[test]
    fn category_price_wins_over_recommend() {
        let intent = classify("Recommend electronics under $200");

        assert_eq!(
            intent,
            Intent::CategoryPrice { category: "electronics", max_price: Decimal::from(200) }
        );
    }

    #[test]
    fn category_price_lists_only_affordable_products() {
        let catalog = Catalog::new(vec![
            electronics("a", "Budget Buds", 12_999, "Acme"),
            electronics("b", "Studio Cans", 29_999, "Acme"),
        ]);

        let routed = route("electronics under $200", &catalog);

        assert_eq!(
            routed.reply,
            "Here are electronics under $200:\n\n• Budget Buds - $129.99 (Acme)\n\nTap any product name to view details!"
        );
    }

    #[test]
    fn listed_prices_are_rounded_to_cents() {
        let catalog = Catalog::new(vec![Product {
            price: Decimal::new(129_995, 3),
            ..electronics("t", "Thing", 0, "Acme")
        }]);

        let routed = route("electronics under $200", &catalog);

        assert!(routed.reply.contains("• Thing - $130.00 (Acme)"), "{}", routed.reply);
    }

    #[test]
    fn category_price_with_no_match_apologises() {
        let catalog = Catalog::new(vec![electronics("b", "Studio Cans", 29_999, "Acme")]);

        let routed = route("any electronics < $50?", &catalog);

        assert_eq!(
            routed.reply,
            "Sorry, I couldn't find any electronics under $50. Try increasing your budget or check our other categories."
        );
    }

    #[test]
    fn unparseable_price_falls_through_to_later_rules() {
        assert_eq!(classify("find electronics under $ fifty"), Intent::Search {
            query: "find electronics under $ fifty".to_string()
        });
        assert_eq!(classify("electronics under $abc").kind(), IntentKind::Fallback);
    }

    #[test]
    fn only_the_first_dollar_amount_counts() {
        assert_eq!(first_dollar_amount("between $100 and $300"), Some(Decimal::from(100)));
        assert_eq!(first_dollar_amount("$ then $75"), Some(Decimal::from(75)));
        assert_eq!(first_dollar_amount("$129.99"), Some(Decimal::from(129)));
        assert_eq!(first_dollar_amount("no amount"), None);
    }

    #[test]
    fn keyword_matching_is_case_insensitive_substring() {
        assert_eq!(classify("Can you SUGGEST something?").kind(), IntentKind::Recommend);
        assert_eq!(classify("What's the price range").kind(), IntentKind::Budget);
        assert_eq!(classify("compare these two").kind(), IntentKind::Compare);
        assert_eq!(classify("go to Checkout").kind(), IntentKind::Cart);
        assert_eq!(classify("hi").kind(), IntentKind::Fallback);
    }

    #[test]
    fn negation_is_not_understood() {
        assert_eq!(classify("don't recommend anything").kind(), IntentKind::Recommend);
    }

    #[test]
    fn search_returns_message_for_recording() {
        let routed = route("Find running shoes", &Catalog::sample());

        assert_eq!(routed.search_to_record.as_deref(), Some("Find running shoes"));
        assert_eq!(routed.reply, "I'll help you search for products. What are you looking for?");
    }

    #[test]
    fn recommend_lists_top_three_names() {
        let routed = route("recommend something", &Catalog::sample());

        assert!(routed.reply.starts_with("Based on your preferences, I recommend: "));
        assert!(routed.reply.ends_with(". Would you like to see details for any of these?"));
        let listed = routed
            .reply
            .trim_start_matches("Based on your preferences, I recommend: ")
            .split(", ")
            .count();
        assert_eq!(listed, 3);
    }

    #[test]
    fn recommend_on_empty_catalog_asks_for_category() {
        let routed = route("recommend something", &Catalog::default());

        assert_eq!(
            routed.reply,
            "I'd be happy to recommend products! Could you tell me what category you're interested in?"
        );
    }

    #[test]
    fn cart_reply_sums_quantities() {
        let catalog = Catalog::sample();
        let behavior = BehaviorStore::new().snapshot();
        let cart = CartSnapshot::new(vec![
            CartLine { product_id: ProductId::new("1"), quantity: 2 },
            CartLine { product_id: ProductId::new("3"), quantity: 1 },
        ]);
        let context = RouteContext { catalog: &catalog, behavior: &behavior, cart: Some(&cart) };

        let routed = IntentRouter::default().route("what's in my cart", &context);

        assert_eq!(
            routed.reply,
            "You have 3 items in your cart. Would you like to proceed to checkout or continue shopping?"
        );
        assert_eq!(routed.search_to_record, None);
    }
}
