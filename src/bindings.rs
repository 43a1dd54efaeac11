//! Solidity contract ABI bindings for the underlying ERC20 and the
//! Stargate wrapper vault.

use alloy::sol;

sol! {
    #[sol(all_derives = true)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    #[sol(all_derives = true)]
    interface IStargateWrapper {
        function balanceOf(address account) external view returns (uint256);
        function previewDeposit(uint256 assets) external view returns (uint256);
        function previewWithdraw(uint256 assets) external view returns (uint256);
        function maxWithdraw(address owner) external view returns (uint256);
        function getRewards() external view returns (uint256);
        function deposit(uint256 assets) external;
        function withdraw(uint256 assets, address receiver) external;
        function claimRewards() external;
    }
}
