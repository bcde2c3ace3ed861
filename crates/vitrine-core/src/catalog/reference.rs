//! The eight-piece reference collection shipped with the application.

use chrono::NaiveDate;

use crate::models::{Artifact, Coordinates};

struct Entry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    era: &'static str,
    origin: &'static str,
    image_url: &'static str,
    category: &'static str,
    coordinates: (i64, i64),
    popularity: i64,
    tags: &'static [&'static str],
    gallery: &'static str,
    date_added: (i32, u32, u32),
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: "1",
        name: "The Golden Pharaoh Mask",
        description: "An exquisite golden funerary mask from ancient Egypt, believed to have \
                      belonged to a high-ranking noble. The intricate craftsmanship showcases \
                      the advanced metallurgical skills of the New Kingdom period.",
        era: "1332-1323 BCE",
        origin: "Ancient Egypt",
        image_url: "https://images.unsplash.com/photo-1594736797933-d0501ba2fe65?w=800",
        category: "Egyptian",
        coordinates: (2, 3),
        popularity: 95,
        tags: &["gold", "funerary", "mask", "pharaoh"],
        gallery: "Egyptian Wing",
        date_added: (2024, 1, 15),
    },
    Entry {
        id: "2",
        name: "Grecian Amphora",
        description: "A beautifully preserved red-figure amphora depicting scenes from the \
                      Trojan War. The vessel demonstrates masterful artistry typical of \
                      Athenian pottery workshops.",
        era: "5th Century BCE",
        origin: "Ancient Greece",
        image_url: "https://images.unsplash.com/photo-1608376630927-4c9ca38dfc71?w=800",
        category: "Greek",
        coordinates: (4, 2),
        popularity: 88,
        tags: &["pottery", "amphora", "greek", "trojan war"],
        gallery: "Greek & Roman Gallery",
        date_added: (2024, 2, 20),
    },
    Entry {
        id: "3",
        name: "Terracotta Warrior",
        description: "An original terracotta soldier from the famous army of Emperor Qin Shi \
                      Huang. Each warrior was individually crafted with unique facial features.",
        era: "210-209 BCE",
        origin: "Ancient China",
        image_url: "https://images.unsplash.com/photo-1591122947157-26bad3a117d2?w=800",
        category: "Asian",
        coordinates: (6, 4),
        popularity: 92,
        tags: &["terracotta", "warrior", "chinese", "qin dynasty"],
        gallery: "Asian Art Wing",
        date_added: (2024, 3, 10),
    },
    Entry {
        id: "4",
        name: "Medieval Knight Armor",
        description: "A complete suit of plate armor from 15th century Germany, featuring \
                      intricate engravings and a fully articulated design allowing remarkable \
                      mobility.",
        era: "15th Century CE",
        origin: "Medieval Germany",
        image_url: "https://images.unsplash.com/photo-1579783902614-a3fb3927b6a5?w=800",
        category: "Medieval",
        coordinates: (3, 5),
        popularity: 85,
        tags: &["armor", "knight", "medieval", "german"],
        gallery: "Arms & Armor Hall",
        date_added: (2024, 1, 28),
    },
    Entry {
        id: "5",
        name: "Jade Emperor Seal",
        description: "An imperial jade seal carved from finest nephrite, bearing the insignia \
                      of the Tang Dynasty. Used to authenticate royal decrees and official \
                      documents.",
        era: "618-907 CE",
        origin: "Tang Dynasty China",
        image_url: "https://images.unsplash.com/photo-1578301978693-85fa9c0320b9?w=800",
        category: "Asian",
        coordinates: (7, 3),
        popularity: 78,
        tags: &["jade", "seal", "imperial", "tang dynasty"],
        gallery: "Asian Art Wing",
        date_added: (2024, 4, 5),
    },
    Entry {
        id: "6",
        name: "Renaissance Oil Painting",
        description: "A stunning Madonna and Child painting attributed to the school of \
                      Raphael, showcasing the soft sfumato technique and ideal beauty of High \
                      Renaissance art.",
        era: "16th Century CE",
        origin: "Renaissance Italy",
        image_url: "https://images.unsplash.com/photo-1578301978018-3005759f48f7?w=800",
        category: "European",
        coordinates: (5, 6),
        popularity: 90,
        tags: &["painting", "renaissance", "madonna", "italian"],
        gallery: "European Masters",
        date_added: (2024, 2, 14),
    },
    Entry {
        id: "7",
        name: "Mayan Calendar Stone",
        description: "A carved stone calendar disc depicting the Mayan long count calendar \
                      system, showcasing their advanced astronomical knowledge.",
        era: "800-900 CE",
        origin: "Ancient Maya",
        image_url: "https://images.unsplash.com/photo-1518709268805-4e9042af9f23?w=800",
        category: "Pre-Columbian",
        coordinates: (1, 4),
        popularity: 82,
        tags: &["calendar", "mayan", "stone", "astronomical"],
        gallery: "Americas Gallery",
        date_added: (2024, 3, 22),
    },
    Entry {
        id: "8",
        name: "Samurai Katana",
        description: "A finely crafted katana from the Edo period, featuring a distinctive \
                      hamon pattern and gold-inlaid tsuba guard.",
        era: "17th Century CE",
        origin: "Edo Japan",
        image_url: "https://images.unsplash.com/photo-1555633514-abcee6ab92e1?w=800",
        category: "Asian",
        coordinates: (8, 2),
        popularity: 87,
        tags: &["katana", "samurai", "japanese", "sword"],
        gallery: "Asian Art Wing",
        date_added: (2024, 4, 18),
    },
];

impl Entry {
    fn to_artifact(&self) -> Artifact {
        let (year, month, day) = self.date_added;
        Artifact {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            era: self.era.to_string(),
            origin: self.origin.to_string(),
            image_url: self.image_url.to_string(),
            category: self.category.to_string(),
            coordinates: Coordinates::new(self.coordinates.0, self.coordinates.1),
            popularity: self.popularity,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            gallery: Some(self.gallery.to_string()),
            // Table dates are literal calendar days.
            date_added: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        }
    }
}

/// Owned copies of the reference collection, in catalog order.
pub fn reference_artifacts() -> Vec<Artifact> {
    ENTRIES.iter().map(Entry::to_artifact).collect()
}
