pub mod stat_cards;
