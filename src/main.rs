fn main() {
  binderdex_lib::run()
}
