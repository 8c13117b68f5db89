mod concurrent_ratings;
