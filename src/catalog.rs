// Built-in preventive health content served by the content and search routes

use once_cell::sync::Lazy;

use crate::models::content::{
    Article, Category, HealthTopic, PreventiveResource, PreventiveTip, Screening,
};
use crate::models::search::SearchItem;

/// Content indexed by the site search
pub static SEARCH_CONTENT: &[SearchItem] = &[
    SearchItem {
        id: "article1",
        title: "اهمیت غربالگری سرطان روده بزرگ",
        summary: "بررسی اهمیت غربالگری منظم برای تشخیص زودهنگام سرطان روده بزرگ",
        content: "غربالگری منظم سرطان روده بزرگ می‌تواند به تشخیص زودهنگام و افزایش شانس درمان کمک کند. توصیه می‌شود افراد بالای ۴۵ سال آزمایش‌های غربالگری را انجام دهند.",
        content_type: "article",
        url: "/articles/article1",
        categories: &["سرطان", "غربالگری", "سلامت گوارش"],
        tags: &["سرطان روده بزرگ", "کولونوسکوپی", "آزمایش مدفوع"],
    },
    SearchItem {
        id: "article2",
        title: "راهنمای جامع فشار خون بالا",
        summary: "همه چیز درباره پیشگیری و مدیریت فشار خون بالا",
        content: "فشار خون بالا یکی از عوامل خطر اصلی برای بیماری‌های قلبی است. تغییرات سبک زندگی مانند ورزش منظم، کاهش مصرف نمک و حفظ وزن سالم می‌تواند به کنترل فشار خون کمک کند.",
        content_type: "article",
        url: "/articles/article2",
        categories: &["قلب و عروق", "فشار خون"],
        tags: &["فشار خون بالا", "سبک زندگی سالم", "رژیم غذایی"],
    },
    SearchItem {
        id: "resource1",
        title: "ویدیو آموزشی: نحوه اندازه‌گیری صحیح فشار خون",
        summary: "آموزش گام به گام اندازه‌گیری دقیق فشار خون در منزل",
        content: "در این ویدیو آموزشی، نحوه صحیح اندازه‌گیری فشار خون در منزل را یاد می‌گیرید. اندازه‌گیری منظم فشار خون به شما کمک می‌کند تا از وضعیت سلامت خود آگاه باشید.",
        content_type: "resource",
        url: "/resources/resource1",
        categories: &["آموزش", "فشار خون"],
        tags: &["سنجش فشار خون", "خودمراقبتی"],
    },
    SearchItem {
        id: "topic1",
        title: "پیشگیری از بیماری‌های قلبی",
        summary: "اطلاعات جامع درباره پیشگیری از بیماری‌های قلبی",
        content: "بیماری‌های قلبی یکی از علل اصلی مرگ‌ومیر در جهان هستند. با رعایت اصول پیشگیرانه می‌توان خطر ابتلا به این بیماری‌ها را کاهش داد.",
        content_type: "topic",
        url: "/health-topics/topic1",
        categories: &["قلب و عروق"],
        tags: &["پیشگیری", "بیماری قلبی", "سلامت قلب"],
    },
];

pub static POPULAR_SEARCHES: &[&str] = &[
    "فشار خون",
    "دیابت",
    "کلسترول",
    "سرطان سینه",
    "کرونا",
    "واکسن آنفولانزا",
    "ویتامین دی",
    "خواب سالم",
    "کاهش وزن",
    "استرس",
];

/// Vocabulary offered by search autocomplete
pub static AUTOCOMPLETE_TERMS: &[&str] = &[
    "فشار خون بالا",
    "فشار خون پایین",
    "فشار خون در بارداری",
    "سرطان سینه",
    "سرطان روده بزرگ",
    "سرطان پوست",
    "دیابت نوع ۱",
    "دیابت نوع ۲",
    "دیابت بارداری",
    "کلسترول بالا",
    "کلسترول خوب و بد",
    "کمبود ویتامین دی",
    "ویتامین دی در بارداری",
    "خواب کافی",
    "اختلالات خواب",
    "کاهش وزن سالم",
    "کاهش وزن سریع",
    "استرس و اضطراب",
    "مدیریت استرس",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub static ARTICLES: Lazy<Vec<Article>> = Lazy::new(|| {
    vec![
        Article {
            id: "article1".to_string(),
            title: "اهمیت غربالگری سرطان روده بزرگ".to_string(),
            summary: "بررسی اهمیت غربالگری منظم برای تشخیص زودهنگام سرطان روده بزرگ".to_string(),
            content: "محتوای مقاله در مورد غربالگری سرطان روده بزرگ...".to_string(),
            author: "دکتر محمد حسینی".to_string(),
            published_date: "2023-10-15".to_string(),
            image_url: Some("/images/colon-cancer-screening.jpg".to_string()),
            categories: strings(&["سرطان", "غربالگری", "سلامت گوارش"]),
            tags: strings(&["سرطان روده بزرگ", "کولونوسکوپی", "آزمایش مدفوع"]),
            read_time: 8,
        },
        Article {
            id: "article2".to_string(),
            title: "راهنمای جامع فشار خون بالا".to_string(),
            summary: "همه چیز درباره پیشگیری و مدیریت فشار خون بالا".to_string(),
            content: "محتوای مقاله در مورد فشار خون بالا...".to_string(),
            author: "دکتر زهرا کریمی".to_string(),
            published_date: "2023-09-22".to_string(),
            image_url: Some("/images/hypertension-guide.jpg".to_string()),
            categories: strings(&["قلب و عروق", "فشار خون"]),
            tags: strings(&["فشار خون بالا", "سبک زندگی سالم", "رژیم غذایی"]),
            read_time: 12,
        },
    ]
});

pub static RESOURCES: Lazy<Vec<PreventiveResource>> = Lazy::new(|| {
    vec![
        PreventiveResource {
            id: "resource1".to_string(),
            title: "ویدیو آموزشی: نحوه اندازه‌گیری صحیح فشار خون".to_string(),
            description: "آموزش گام به گام اندازه‌گیری دقیق فشار خون در منزل".to_string(),
            resource_type: "video".to_string(),
            url: "/resources/blood-pressure-measurement-video".to_string(),
            categories: strings(&["آموزش", "فشار خون"]),
            tags: strings(&["سنجش فشار خون", "خودمراقبتی"]),
        },
        PreventiveResource {
            id: "resource2".to_string(),
            title: "اینفوگرافیک: علائم هشدار دهنده سکته مغزی".to_string(),
            description: "تشخیص سریع علائم سکته مغزی می‌تواند زندگی‌بخش باشد".to_string(),
            resource_type: "infographic".to_string(),
            url: "/resources/stroke-warning-signs-infographic".to_string(),
            categories: strings(&["مغز و اعصاب", "اورژانس"]),
            tags: strings(&["سکته مغزی", "علائم هشدار"]),
        },
    ]
});

pub static CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    let category = |id: &str, name: &str, description: &str, parent_id: Option<&str>| Category {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        parent_id: parent_id.map(|p| p.to_string()),
    };
    vec![
        category("cat1", "قلب و عروق", "مطالب مرتبط با سلامت قلب و سیستم گردش خون", None),
        category("cat2", "فشار خون", "مطالب مرتبط با پیشگیری و مدیریت فشار خون", Some("cat1")),
        category("cat3", "سرطان", "مطالب مرتبط با پیشگیری، تشخیص زودهنگام و درمان سرطان", None),
        category("cat4", "تغذیه", "مطالب مرتبط با تغذیه سالم و رژیم غذایی", None),
    ]
});

pub static HEALTH_TOPICS: Lazy<Vec<HealthTopic>> = Lazy::new(|| {
    let topic = |id: &str, name: &str, description: &str, category: &str| HealthTopic {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        related_categories: vec![category.to_string()],
    };
    vec![
        topic("topic1", "پیشگیری از بیماری‌های قلبی", "اطلاعات جامع درباره پیشگیری از بیماری‌های قلبی", "cat1"),
        topic("topic2", "سبک زندگی سالم", "راهنمای جامع برای داشتن سبک زندگی سالم", "cat4"),
        topic("topic3", "غربالگری‌های ضروری", "آشنایی با آزمایشات غربالگری مهم در سنین مختلف", "cat3"),
    ]
});

pub static SCREENINGS: Lazy<Vec<Screening>> = Lazy::new(|| {
    let screening = |name: &str, frequency: &str, ages: &str, gender: &str| Screening {
        name: name.to_string(),
        frequency: frequency.to_string(),
        recommended_ages: ages.to_string(),
        gender: gender.to_string(),
    };
    vec![
        screening("فشار خون", "سالانه", "۱۸ سال به بالا", "همه"),
        screening("کلسترول", "هر ۴-۶ سال", "۲۰ سال به بالا", "همه"),
        screening("ماموگرافی", "هر ۱-۲ سال", "۴۰-۷۵ سال", "زنان"),
        screening("کولونوسکوپی", "هر ۱۰ سال", "۴۵-۷۵ سال", "همه"),
    ]
});

pub static PREVENTIVE_TIPS: Lazy<Vec<PreventiveTip>> = Lazy::new(|| {
    let tip = |id: &str, title: &str, content: &str, category: &str| PreventiveTip {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
    };
    vec![
        tip(
            "tip1",
            "کاهش مصرف نمک",
            "محدود کردن مصرف نمک به کمتر از ۵ گرم در روز می‌تواند به کاهش فشار خون کمک کند.",
            "فشار خون",
        ),
        tip(
            "tip2",
            "ورزش منظم",
            "حداقل ۱۵۰ دقیقه فعالیت بدنی متوسط در هفته برای سلامت قلب مفید است.",
            "قلب",
        ),
        tip(
            "tip3",
            "مصرف میوه و سبزیجات",
            "روزانه حداقل ۵ وعده میوه و سبزیجات مصرف کنید.",
            "تغذیه",
        ),
    ]
});

/// Articles filtered by category and tag, newest first, then paginated
pub fn list_articles(
    category: Option<&str>,
    tag: Option<&str>,
    limit: usize,
    offset: usize,
) -> Vec<Article> {
    let mut articles: Vec<Article> = ARTICLES
        .iter()
        .filter(|a| category.map_or(true, |c| a.categories.iter().any(|x| x == c)))
        .filter(|a| tag.map_or(true, |t| a.tags.iter().any(|x| x == t)))
        .cloned()
        .collect();

    // ISO dates sort lexicographically
    articles.sort_by(|a, b| b.published_date.cmp(&a.published_date));

    articles.into_iter().skip(offset).take(limit).collect()
}

pub fn find_article(article_id: &str) -> Option<Article> {
    ARTICLES.iter().find(|a| a.id == article_id).cloned()
}

pub fn featured_articles(limit: usize) -> Vec<Article> {
    list_articles(None, None, limit, 0)
}

pub fn list_resources(
    category: Option<&str>,
    resource_type: Option<&str>,
    limit: usize,
    offset: usize,
) -> Vec<PreventiveResource> {
    RESOURCES
        .iter()
        .filter(|r| category.map_or(true, |c| r.categories.iter().any(|x| x == c)))
        .filter(|r| resource_type.map_or(true, |t| r.resource_type == t))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}

pub fn find_resource(resource_id: &str) -> Option<PreventiveResource> {
    RESOURCES.iter().find(|r| r.id == resource_id).cloned()
}

/// All categories, or only the direct children of `parent_id`
pub fn list_categories(parent_id: Option<&str>) -> Vec<Category> {
    match parent_id {
        Some(parent) => subcategories(parent),
        None => CATEGORIES.clone(),
    }
}

pub fn find_category(category_id: &str) -> Option<Category> {
    CATEGORIES.iter().find(|c| c.id == category_id).cloned()
}

pub fn subcategories(parent_id: &str) -> Vec<Category> {
    CATEGORIES
        .iter()
        .filter(|c| c.parent_id.as_deref() == Some(parent_id))
        .cloned()
        .collect()
}

pub fn tips(category: Option<&str>) -> Vec<PreventiveTip> {
    PREVENTIVE_TIPS
        .iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .cloned()
        .collect()
}
