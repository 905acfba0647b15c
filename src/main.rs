fn main() {
    cave_levels::cli::run();
}
