use super::CakeItem;

pub(super) static CAKES: &[CakeItem] = &[
    CakeItem {
        id: "chocolate-truffle",
        name: "Chocolate Truffle Cake",
        description: "Rich dark chocolate sponge layered with silky ganache and truffle shavings.",
        categories: &["chocolate", "birthday"],
        price_cents: 4_500,
        image: "/images/cakes/chocolate-truffle.jpg",
    },
    CakeItem {
        id: "strawberry-shortcake",
        name: "Strawberry Shortcake",
        description: "Light vanilla sponge with fresh strawberries and whipped cream.",
        categories: &["fruit", "vanilla"],
        price_cents: 3_800,
        image: "/images/cakes/strawberry-shortcake.jpg",
    },
    CakeItem {
        id: "classic-vanilla",
        name: "Classic Vanilla Bean",
        description: "Madagascar vanilla bean sponge with buttercream frosting.",
        categories: &["vanilla", "birthday", "celebration"],
        price_cents: 3_500,
        image: "/images/cakes/classic-vanilla.jpg",
    },
    CakeItem {
        id: "three-tier-wedding",
        name: "Three-Tier Wedding Cake",
        description: "Elegant white fondant tiers finished with sugar flowers.",
        categories: &["wedding", "vanilla", "celebration"],
        price_cents: 32_000,
        image: "/images/cakes/three-tier-wedding.jpg",
    },
    CakeItem {
        id: "red-velvet-cupcakes",
        name: "Red Velvet Cupcakes",
        description: "A dozen red velvet cupcakes topped with cream cheese frosting.",
        categories: &["cupcakes", "gift"],
        price_cents: 2_800,
        image: "/images/cakes/red-velvet-cupcakes.jpg",
    },
    CakeItem {
        id: "lemon-blueberry",
        name: "Lemon Blueberry Drizzle",
        description: "Zesty lemon cake studded with blueberries under a sweet glaze.",
        categories: &["fruit"],
        price_cents: 3_600,
        image: "/images/cakes/lemon-blueberry.jpg",
    },
    CakeItem {
        id: "city-skyline",
        name: "City Skyline Cake",
        description: "Modern sculpted cake inspired by the metropolitan skyline at night.",
        categories: &["metropolitan", "themed"],
        price_cents: 7_500,
        image: "/images/cakes/city-skyline.jpg",
    },
    CakeItem {
        id: "unicorn-dream",
        name: "Unicorn Dream",
        description: "Pastel rainbow layers with a golden horn for magical parties.",
        categories: &["themed", "birthday"],
        price_cents: 5_500,
        image: "/images/cakes/unicorn-dream.jpg",
    },
    CakeItem {
        id: "mini-gift-box",
        name: "Mini Gift Box Cake",
        description: "A petite chocolate cake dressed as a wrapped present.",
        categories: &["gift", "chocolate"],
        price_cents: 2_500,
        image: "/images/cakes/mini-gift-box.jpg",
    },
    CakeItem {
        id: "black-forest",
        name: "Black Forest Gateau",
        description: "Chocolate sponge, kirsch cherries and fresh cream.",
        categories: &["chocolate", "fruit", "celebration"],
        price_cents: 4_800,
        image: "/images/cakes/black-forest.jpg",
    },
    CakeItem {
        id: "vanilla-cupcake-tower",
        name: "Vanilla Cupcake Tower",
        description: "Two dozen vanilla cupcakes arranged on a tiered stand.",
        categories: &["cupcakes", "vanilla", "wedding"],
        price_cents: 6_200,
        image: "/images/cakes/vanilla-cupcake-tower.jpg",
    },
    CakeItem {
        id: "anniversary-rose",
        name: "Anniversary Rose Cake",
        description: "Rose-scented sponge piped with buttercream roses.",
        categories: &["celebration", "gift"],
        price_cents: 5_200,
        image: "/images/cakes/anniversary-rose.jpg",
    },
];
