//! Solidity interfaces the helpers talk to

use alloy::sol;

sol! {
    /// Fungible token. Only the metadata getters are read here; the rest is
    /// used by whoever funds and approves the arbitrage contract.
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
        function name() external view returns (string memory);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Returns the zero address when no pair exists.
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }
}

sol! {
    /// On-chain executor fed by the price signals. Trade logic lives in
    /// the contract; this side only encodes calls to it.
    #[sol(rpc)]
    interface IArbitrage {
        function executeTrade(
            bool startOnExchangeA,
            bool startOnExchangeB,
            address tokenIn,
            address tokenOut,
            uint256 amount
        ) external;
    }
}
