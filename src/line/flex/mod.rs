use serde::Serialize;

use crate::product::{MAX_ITEMS, ProductList, ProductRecord};

/// Shown by clients that cannot render Flex messages (and in notifications).
pub const ALT_TEXT: &str = "This is a Flex Message";

/// Appended to the integer yen price.
pub const PRICE_SUFFIX: &str = "円";

/// Label of the button that opens the product page ("to the Rakuten Ichiba product page").
pub const BUTTON_LABEL: &str = "楽天市場商品ページへ";

const HERO_ASPECT_RATIO: &str = "20:13";

/// A message object accepted by the reply API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: FlexContainer,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexContainer {
    Carousel { contents: Vec<Bubble> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "bubble")]
pub struct Bubble {
    pub hero: Component,
    pub body: Component,
    pub footer: Component,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Box(BoxComponent),
    Text(TextComponent),
    Image(ImageComponent),
    Button(ButtonComponent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxComponent {
    pub layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    pub contents: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageComponent {
    pub size: String,
    #[serde(rename = "aspectRatio")]
    pub aspect_ratio: String,
    #[serde(rename = "aspectMode")]
    pub aspect_mode: AspectMode,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonComponent {
    pub style: ButtonStyle,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Uri { label: String, uri: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Vertical,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
}

/// Render the product carousel.
///
/// Slots 0..3 are visited in order and an empty slot contributes no bubble, so
/// fewer than three products (or none) yields a shorter carousel.
pub fn build(items: &ProductList) -> ReplyMessage {
    let bubbles = (0..MAX_ITEMS)
        .filter_map(|slot| items.get(slot))
        .map(build_card)
        .collect();

    ReplyMessage::Flex {
        alt_text: ALT_TEXT.to_string(),
        contents: FlexContainer::Carousel { contents: bubbles },
    }
}

/// One product bubble: hero image, bold title and price, and a store button.
pub fn build_card(item: &ProductRecord) -> Bubble {
    let hero = Component::Image(ImageComponent {
        size: "full".to_string(),
        aspect_ratio: HERO_ASPECT_RATIO.to_string(),
        aspect_mode: AspectMode::Cover,
        url: item.image_url.clone(),
    });

    let title = Component::Text(TextComponent {
        text: item.name.clone(),
        wrap: Some(true),
        weight: Some(Weight::Bold),
        size: Some("lg".to_string()),
        flex: None,
    });

    let price = Component::Box(BoxComponent {
        layout: Layout::Baseline,
        spacing: None,
        contents: vec![Component::Text(TextComponent {
            text: format!("{}{}", item.price, PRICE_SUFFIX),
            wrap: Some(true),
            weight: Some(Weight::Bold),
            size: None,
            flex: Some(0),
        })],
    });

    let body = Component::Box(BoxComponent {
        layout: Layout::Vertical,
        spacing: Some("sm".to_string()),
        contents: vec![title, price],
    });

    let footer = Component::Box(BoxComponent {
        layout: Layout::Vertical,
        spacing: Some("sm".to_string()),
        contents: vec![Component::Button(ButtonComponent {
            style: ButtonStyle::Primary,
            action: Action::Uri {
                label: BUTTON_LABEL.to_string(),
                uri: item.url.clone(),
            },
        })],
    });

    Bubble { hero, body, footer }
}
